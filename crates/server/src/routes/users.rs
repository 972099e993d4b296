//! Account route handlers: signup and the OTP-backed email flows.
//!
//! Signup and forgot-password only ever enqueue the notification task; the
//! SMTP round trip happens on the dispatch worker, never on the request
//! path.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use tableside_core::{Email, OtpCode};

use crate::error::{AppError, Result};
use crate::models::User;
use crate::services::email::EmailTask;
use crate::services::otp::OtpError;
use crate::services::password::{MIN_PASSWORD_LENGTH, hash_password};
use crate::state::AppState;

/// Body of `POST /users/signup`.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
}

/// Body of `POST /users/verify-otp`.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: Option<String>,
    pub otp: Option<String>,
}

/// Body of `POST /users/forgot-password`.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

/// Body of `POST /users/reset-password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: Option<String>,
    pub otp: Option<String>,
    pub new_password: Option<String>,
}

fn required(field: Option<String>, message: &str) -> Result<String> {
    field
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::Validation(message.to_owned()))
}

fn parse_email(field: Option<String>) -> Result<Email> {
    let raw = required(field, "Email is required")?;
    Ok(Email::parse(&raw)?)
}

/// The stored secret is an exact six-digit string; anything else can never
/// match, so a malformed candidate reports as a mismatch rather than a
/// validation error.
fn parse_otp(field: Option<String>) -> Result<OtpCode> {
    let raw = required(field, "OTP is required")?;
    OtpCode::parse(&raw).map_err(|_| AppError::Otp(OtpError::Mismatch))
}

fn validate_password(field: Option<String>, message: &str) -> Result<String> {
    let password = required(field, message)?;
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(password)
}

/// `POST /users/signup` - register an account and queue a verification OTP.
///
/// A queue failure here is logged but does not fail the signup; the account
/// exists either way and the OTP can be re-requested via forgot-password.
#[instrument(skip(state, body))]
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<Json<Value>> {
    let first_name = required(body.first_name, "First name is required")?;
    let last_name = required(body.last_name, "Last name is required")?;
    let email = parse_email(body.email)?;
    let password = validate_password(body.password, "Password is required")?;

    if state.users().get_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("email already exists".to_owned()));
    }

    let password_hash = hash_password(&password)?;
    let user = User::new(first_name, last_name, email.clone(), password_hash, body.phone);

    let otp = state.otp().issue(&email).await?;

    if let Err(e) = EmailTask::verification(&email, &otp)
        .enqueue(state.queue())
        .await
    {
        tracing::error!(email = %email, error = %e, "Failed to queue verification email");
    }

    state.users().insert(&user).await?;

    tracing::info!(user_id = %user.user_id, "Account created");

    Ok(Json(json!({
        "message": "User created successfully. Please check your email for verification.",
        "user_id": user.user_id,
    })))
}

/// `POST /users/verify-otp` - prove control of the signup email.
#[instrument(skip(state, body))]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<Json<Value>> {
    let email = parse_email(body.email)?;
    let otp = parse_otp(body.otp)?;

    state.otp().verify(&email, &otp).await?;

    if !state.users().set_verified(&email).await? {
        return Err(AppError::NotFound("User not found".to_owned()));
    }

    Ok(Json(json!({ "message": "OTP verified successfully" })))
}

/// `POST /users/forgot-password` - queue a password-reset OTP.
///
/// Unlike signup, the queue push is load-bearing here: the caller gets a 500
/// if the task cannot be queued, because without the email the flow is dead.
#[instrument(skip(state, body))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Json<Value>> {
    let email = parse_email(body.email)?;

    if state.users().get_by_email(&email).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_owned()));
    }

    let otp = state.otp().issue(&email).await?;
    EmailTask::password_reset(&email, &otp)
        .enqueue(state.queue())
        .await?;

    Ok(Json(
        json!({ "message": "Reset password OTP sent to your email" }),
    ))
}

/// `POST /users/reset-password` - set a new password after OTP verification.
#[instrument(skip(state, body))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<Value>> {
    let email = parse_email(body.email)?;
    let otp = parse_otp(body.otp)?;
    let new_password = validate_password(body.new_password, "New password is required")?;

    state.otp().verify(&email, &otp).await?;

    let password_hash = hash_password(&new_password)?;
    if !state.users().set_password_hash(&email, &password_hash).await? {
        return Err(AppError::NotFound("User not found".to_owned()));
    }

    Ok(Json(json!({ "message": "Password reset successfully" })))
}
