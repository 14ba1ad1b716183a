mod admin_dtos;

pub use admin_dtos::{AdminUserDto, RecordsOverviewDto, ResetPasswordDto, SetAdminDto};
