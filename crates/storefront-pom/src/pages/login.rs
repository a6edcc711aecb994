use crate::page_object::{PageContext, PageObject};
use crate::result::PomResult;

const USERNAME_FIELD: &str = "usernameField";
const PASSWORD_FIELD: &str = "passwordField";
const LOGIN_BUTTON: &str = "loginButton";
const ERROR_MESSAGE: &str = "errorMessage";

/// Login form
#[derive(Debug, Clone)]
pub struct LoginPage {
    ctx: PageContext,
}

impl PageObject for LoginPage {
    const NAME: &'static str = "login";
    const URL_PATTERN: &'static str = "/";

    fn from_context(ctx: PageContext) -> Self {
        Self { ctx }
    }

    fn context(&self) -> &PageContext {
        &self.ctx
    }
}

impl LoginPage {
    /// Type the user name
    pub async fn enter_username(&self, username: &str) -> PomResult<()> {
        self.ctx.type_into(USERNAME_FIELD, username).await
    }

    /// Type the password
    pub async fn enter_password(&self, password: &str) -> PomResult<()> {
        self.ctx.type_into(PASSWORD_FIELD, password).await
    }

    /// Submit the form
    pub async fn click_login(&self) -> PomResult<()> {
        self.ctx.click(LOGIN_BUTTON).await
    }

    /// Fill both fields and submit
    pub async fn login(&self, username: &str, password: &str) -> PomResult<()> {
        self.enter_username(username).await?;
        self.enter_password(password).await?;
        self.click_login().await
    }

    /// Text of the error banner
    pub async fn error_message(&self) -> PomResult<String> {
        self.ctx.read_text(ERROR_MESSAGE).await
    }

    /// Whether the error banner shows within the presence timeout
    pub async fn has_error(&self) -> bool {
        self.ctx.is_present(ERROR_MESSAGE).await
    }
}
