pub mod capture;
pub mod home;
pub mod login;
pub mod recovery;
pub mod register;

#[cfg(test)]
pub(crate) mod testing;

pub use capture::CaptureModal;
pub use home::Home;
pub use login::Login;
pub use recovery::Recovery;
pub use register::Register;

use crate::ui::{context::AppContext, state::Route, traits::View};

pub fn build(route: Route, ctx: &AppContext) -> Box<dyn View> {
    match route {
        Route::Login => Box::new(Login::default()),
        Route::Register => Box::new(Register::default()),
        Route::Recovery => Box::new(Recovery::new(ctx)),
        Route::Home => Box::new(Home::new(ctx)),
    }
}
