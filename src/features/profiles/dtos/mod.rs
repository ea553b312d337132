mod profile_dto;

pub use profile_dto::{ProfileQueryParams, ProfileResponseDto, UpdateProfileDto, UpdateRoleDto};
