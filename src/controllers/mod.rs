pub mod entry_exit_controller;
pub mod tool_controller;
