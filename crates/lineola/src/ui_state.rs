#[derive(Clone, Default)]
pub struct UIState {
    pub status_message: String,
    pub should_quit: bool,
}

impl UIState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_status_message(&self) -> &str {
        &self.status_message
    }

    pub fn set_info_message(&mut self, message: String) {
        self.status_message = message;
    }

    pub fn set_error_message(&mut self, message: String) {
        log::error!("{}", message);
        self.status_message = message;
    }

    pub fn clear_status_message(&mut self) {
        self.status_message.clear();
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}
