mod complaint_dto;

pub use complaint_dto::{
    AssignComplaintDto, ComplaintQueryParams, ComplaintResponseDto, ComplaintSortBy,
    CreateComplaintDto, SortDirection, UpdateStatusDto, UploadImagesDto,
};
