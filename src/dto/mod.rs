pub mod api_response;
pub mod entry_exit_dto;
pub mod tool_dto;
