//! Account route handlers.
//!
//! Login and registration are public. Management, update, and password
//! change require a logged-in account, and update and password change only
//! ever act on the caller's own account.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use cse_motors_core::AccountId;

use super::parse_id;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::auth::{ACCOUNT_PATH, LOGIN_PATH, SetCookie};
use crate::middleware::RequireLogin;
use crate::models::IdentityClaims;
use crate::routes::layout::{Layout, Page};
use crate::services::auth::AuthError;
use crate::validation::{
    AccountUpdateForm, FormError, LoginForm, PasswordForm, RegisterForm, ValidationErrors,
};

const UNAUTHORIZED_NOTICE: &str = "Unauthorized access attempt.";
const ACCOUNT_NOT_FOUND: &str = "Sorry, we couldn't find that account.";

// =============================================================================
// Templates
// =============================================================================

/// Login form. The password is never echoed back.
#[derive(Template, WebTemplate)]
#[template(path = "account/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub form: LoginForm,
    pub errors: ValidationErrors,
}

/// Registration form.
#[derive(Template, WebTemplate)]
#[template(path = "account/register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
    pub form: RegisterForm,
    pub errors: ValidationErrors,
}

/// Account management landing page.
#[derive(Template, WebTemplate)]
#[template(path = "account/management.html")]
pub struct ManagementTemplate {
    pub layout: Layout,
    pub claims: IdentityClaims,
}

/// Account update page with the details and password forms.
#[derive(Template, WebTemplate)]
#[template(path = "account/update.html")]
pub struct UpdateTemplate {
    pub layout: Layout,
    pub form: AccountUpdateForm,
    pub errors: ValidationErrors,
    pub password_errors: ValidationErrors,
}

// =============================================================================
// Login and registration
// =============================================================================

async fn render_login(
    page: &Page,
    form: LoginForm,
    errors: ValidationErrors,
    status: StatusCode,
) -> Result<Response> {
    let template = LoginTemplate {
        layout: page.layout("Login").await?,
        form: LoginForm {
            account_password: String::new(),
            ..form
        },
        errors,
    };
    Ok((status, template).into_response())
}

/// Display the login form.
#[instrument(skip_all)]
pub async fn login_page(page: Page) -> Result<Response> {
    render_login(
        &page,
        LoginForm::default(),
        ValidationErrors::new(),
        StatusCode::OK,
    )
    .await
}

/// Check credentials and set the identity cookie.
#[instrument(skip_all)]
pub async fn login(page: Page, Form(form): Form<LoginForm>) -> Result<Response> {
    if let Err(errors) = form.validate() {
        return render_login(&page, form, errors, StatusCode::BAD_REQUEST).await;
    }

    let account = match page
        .state
        .auth()
        .login(&form.account_email, &form.account_password)
        .await
    {
        Ok(account) => account,
        Err(AuthError::InvalidCredentials | AuthError::InvalidEmail(_)) => {
            tracing::info!("Login failed: invalid credentials");
            page.notice("Please check your credentials and try again.")
                .await?;
            return render_login(
                &page,
                form,
                ValidationErrors::new(),
                StatusCode::BAD_REQUEST,
            )
            .await;
        }
        Err(e) => return Err(e.into()),
    };

    let token = page.state.tokens().issue(&IdentityClaims::from(&account))?;
    tracing::info!(account_id = %account.account_id, "Account logged in");

    Ok((
        SetCookie::token(&page.state, token),
        Redirect::to(ACCOUNT_PATH),
    )
        .into_response())
}

async fn render_register(
    page: &Page,
    form: RegisterForm,
    errors: ValidationErrors,
    status: StatusCode,
) -> Result<Response> {
    let template = RegisterTemplate {
        layout: page.layout("Register").await?,
        form: RegisterForm {
            account_password: String::new(),
            ..form
        },
        errors,
    };
    Ok((status, template).into_response())
}

/// Display the registration form.
#[instrument(skip_all)]
pub async fn register_page(page: Page) -> Result<Response> {
    render_register(
        &page,
        RegisterForm::default(),
        ValidationErrors::new(),
        StatusCode::OK,
    )
    .await
}

/// Create a `Client` account.
#[instrument(skip_all)]
pub async fn register(page: Page, Form(form): Form<RegisterForm>) -> Result<Response> {
    let valid = match page.state.validator().registration(&form).await {
        Ok(valid) => valid,
        Err(FormError::Invalid(errors)) => {
            return render_register(&page, form, errors, StatusCode::BAD_REQUEST).await;
        }
        Err(FormError::Store(e)) => return Err(e.into()),
    };

    let result = page
        .state
        .auth()
        .register(
            &valid.account_firstname,
            &valid.account_lastname,
            valid.account_email,
            &form.account_password,
        )
        .await;

    match result {
        Ok(account) => {
            tracing::info!(account_id = %account.account_id, "Account registered");
            page.notice(format!(
                "Congratulations, you're registered {}. Please log in.",
                account.account_firstname
            ))
            .await?;
            Ok(Redirect::to(LOGIN_PATH).into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Registration failed");
            page.notice("Sorry, the registration failed.").await?;
            render_register(
                &page,
                form,
                ValidationErrors::new(),
                StatusCode::NOT_IMPLEMENTED,
            )
            .await
        }
    }
}

/// Clear the identity cookie.
pub async fn logout(page: Page) -> Response {
    if let Some(claims) = page.claims() {
        tracing::info!(account_id = %claims.account_id, "Account logged out");
    }
    (SetCookie::removal(&page.state), Redirect::to("/")).into_response()
}

// =============================================================================
// Account management
// =============================================================================

/// Display the account management page.
#[instrument(skip_all)]
pub async fn management(RequireLogin(claims): RequireLogin, page: Page) -> Result<ManagementTemplate> {
    Ok(ManagementTemplate {
        layout: page.layout("Account Management").await?,
        claims,
    })
}

async fn render_update(
    page: &Page,
    form: AccountUpdateForm,
    errors: ValidationErrors,
    password_errors: ValidationErrors,
    status: StatusCode,
) -> Result<Response> {
    let template = UpdateTemplate {
        layout: page.layout("Account Update").await?,
        form,
        errors,
        password_errors,
    };
    Ok((status, template).into_response())
}

/// Refuse a request aimed at someone else's account.
async fn unauthorized(page: &Page, claimed: &str, own: AccountId) -> Result<Response> {
    tracing::warn!(claimed, account_id = %own, "Account id mismatch");
    page.notice(UNAUTHORIZED_NOTICE).await?;
    Ok(Redirect::to(ACCOUNT_PATH).into_response())
}

/// Whether a submitted id names the caller's own account.
fn is_own_account(raw: &str, own: AccountId) -> bool {
    parse_id::<AccountId>(raw, "").is_ok_and(|id| id == own)
}

/// Display the update form for the caller's own account.
#[instrument(skip(page, claims))]
pub async fn update_page(
    RequireLogin(claims): RequireLogin,
    page: Page,
    Path(account_id): Path<String>,
) -> Result<Response> {
    if !is_own_account(&account_id, claims.account_id) {
        return unauthorized(&page, &account_id, claims.account_id).await;
    }

    let account = page
        .state
        .accounts()
        .get_account_by_id(claims.account_id)
        .await?
        .ok_or_else(|| AppError::NotFound(ACCOUNT_NOT_FOUND.to_string()))?;

    render_update(
        &page,
        AccountUpdateForm::from(&account),
        ValidationErrors::new(),
        ValidationErrors::new(),
        StatusCode::OK,
    )
    .await
}

/// Update the caller's names and email, then reissue their token.
#[instrument(skip_all)]
pub async fn update(
    RequireLogin(claims): RequireLogin,
    page: Page,
    Form(form): Form<AccountUpdateForm>,
) -> Result<Response> {
    if !is_own_account(&form.account_id, claims.account_id) {
        return unauthorized(&page, &form.account_id, claims.account_id).await;
    }

    let update = match page
        .state
        .validator()
        .account_update(&form, claims.account_id, &claims.account_email)
        .await
    {
        Ok(update) => update,
        Err(FormError::Invalid(errors)) => {
            return render_update(
                &page,
                form,
                errors,
                ValidationErrors::new(),
                StatusCode::BAD_REQUEST,
            )
            .await;
        }
        Err(FormError::Store(e)) => return Err(e.into()),
    };

    if let Err(e) = page.state.accounts().update_account(update).await {
        tracing::warn!(error = %e, account_id = %claims.account_id, "Account update failed");
        page.notice("Sorry, the account update failed.").await?;
        return render_update(
            &page,
            form,
            ValidationErrors::new(),
            ValidationErrors::new(),
            StatusCode::NOT_IMPLEMENTED,
        )
        .await;
    }

    let cookie = refreshed_cookie(&page, claims.account_id).await?;
    tracing::info!(account_id = %claims.account_id, "Account updated");
    page.notice("Account details updated successfully.").await?;
    Ok((cookie, Redirect::to(ACCOUNT_PATH)).into_response())
}

/// Change the caller's password, then reissue their token.
#[instrument(skip_all)]
pub async fn update_password(
    RequireLogin(claims): RequireLogin,
    page: Page,
    Form(form): Form<PasswordForm>,
) -> Result<Response> {
    if !is_own_account(&form.account_id, claims.account_id) {
        return unauthorized(&page, &form.account_id, claims.account_id).await;
    }

    if let Err(password_errors) = form.validate() {
        return render_update(
            &page,
            AccountUpdateForm::from(&claims),
            ValidationErrors::new(),
            password_errors,
            StatusCode::BAD_REQUEST,
        )
        .await;
    }

    if let Err(e) = page
        .state
        .auth()
        .change_password(claims.account_id, &form.account_password)
        .await
    {
        tracing::warn!(error = %e, account_id = %claims.account_id, "Password change failed");
        page.notice("Sorry, the password change failed.").await?;
        return render_update(
            &page,
            AccountUpdateForm::from(&claims),
            ValidationErrors::new(),
            ValidationErrors::new(),
            StatusCode::NOT_IMPLEMENTED,
        )
        .await;
    }

    let cookie = refreshed_cookie(&page, claims.account_id).await?;
    tracing::info!(account_id = %claims.account_id, "Password changed");
    page.notice("Password updated successfully.").await?;
    Ok((cookie, Redirect::to(ACCOUNT_PATH)).into_response())
}

/// Token cookie minted from the stored account, so the next request sees
/// the current names and email.
async fn refreshed_cookie(page: &Page, account_id: AccountId) -> Result<SetCookie> {
    let account = page
        .state
        .accounts()
        .get_account_by_id(account_id)
        .await?
        .ok_or_else(|| AppError::NotFound(ACCOUNT_NOT_FOUND.to_string()))?;
    let token = page.state.tokens().issue(&IdentityClaims::from(&account))?;
    Ok(SetCookie::token(&page.state, token))
}
