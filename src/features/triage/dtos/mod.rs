mod triage_dto;

pub use triage_dto::{
    CategorizeRequest, CategorizeRequestDto, CategorizeResponseDto, TriageErrorDto,
};
