use crate::ui::components::toast::ToastStack;

#[derive(Debug, Default)]
pub struct AppState {
    pub ui: UiState,
    pub toasts: ToastStack,
}

#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub current_route: Route,
    pub has_focus: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Route {
    #[default]
    Login,
    Register,
    Recovery,
    Home,
}

impl Route {
    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Iniciar sesión",
            Route::Register => "Crear cuenta",
            Route::Recovery => "Recuperar contraseña",
            Route::Home => "Inicio",
        }
    }

    /// Routes that require a valid session.
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Home)
    }
}
