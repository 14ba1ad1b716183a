mod report_dto;
mod search_dto;

pub use report_dto::{ReportRequestDto, ReportResponseDto};
pub use search_dto::{SearchFilters, SearchQueryDto, SortKey};
