mod catalog_dto;

pub use catalog_dto::{
    CatalogItemDetailDto, CatalogItemResponseDto, CreateCatalogItemDto, UpdateCatalogItemDto,
};
