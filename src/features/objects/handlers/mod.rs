mod command_handler;

pub use command_handler::handle_action;
