pub mod captcha;
pub mod scanner;
pub mod session_manager;

pub use captcha::{CaptchaSolver, SolverFn, TesseractSolver};
pub use scanner::Scanner;
pub use session_manager::{SessionManager, SessionState};
