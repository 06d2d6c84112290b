mod session_vm;

pub use session_vm::{ReviewRow, SessionIntent, SessionVm, start_session};
