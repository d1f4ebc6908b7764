#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryStep {
    #[default]
    Email,
    Code,
    NewPassword,
}

impl RecoveryStep {
    pub const ALL: [RecoveryStep; 3] = [
        RecoveryStep::Email,
        RecoveryStep::Code,
        RecoveryStep::NewPassword,
    ];

    /// One-based position, as shown in the step indicator.
    pub fn number(&self) -> usize {
        match self {
            RecoveryStep::Email => 1,
            RecoveryStep::Code => 2,
            RecoveryStep::NewPassword => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecoveryStep::Email => "Correo",
            RecoveryStep::Code => "Código",
            RecoveryStep::NewPassword => "Nueva contraseña",
        }
    }

    pub fn previous(&self) -> Option<Self> {
        match self {
            RecoveryStep::Email => None,
            RecoveryStep::Code => Some(RecoveryStep::Email),
            RecoveryStep::NewPassword => Some(RecoveryStep::Code),
        }
    }
}

/// The four server round-trips the wizard can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryOp {
    RequestReset,
    VerifyCode,
    ResetPassword,
    ResendCode,
}

impl RecoveryOp {
    pub fn task_key(&self) -> &'static str {
        match self {
            RecoveryOp::RequestReset => "request_reset",
            RecoveryOp::VerifyCode => "verify_code",
            RecoveryOp::ResetPassword => "reset_password",
            RecoveryOp::ResendCode => "resend_code",
        }
    }

    pub fn error_title(&self) -> &'static str {
        match self {
            RecoveryOp::RequestReset => "No se pudo enviar el código",
            RecoveryOp::VerifyCode => "Código incorrecto",
            RecoveryOp::ResetPassword => "No se pudo cambiar la contraseña",
            RecoveryOp::ResendCode => "No se pudo reenviar el código",
        }
    }

    /// Step reached once the success notice has been on screen for the
    /// op's delay. `ResetPassword` leaves the wizard instead.
    pub fn next_step(&self) -> Option<RecoveryStep> {
        match self {
            RecoveryOp::RequestReset => Some(RecoveryStep::Code),
            RecoveryOp::VerifyCode => Some(RecoveryStep::NewPassword),
            RecoveryOp::ResetPassword | RecoveryOp::ResendCode => None,
        }
    }
}
