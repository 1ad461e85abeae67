use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{LoginForm, RegisterForm},
        jwt::{JwtKeys, TokenError},
        password::{hash_password, verify_password},
    },
    error::AppError,
    mailer::verification_email,
    state::AppState,
    users::repo_types::User,
    validation,
};

/// Registration fields after trimming and email normalization.
#[derive(Debug)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

pub fn validate_registration(form: RegisterForm) -> Result<Registration, AppError> {
    Ok(Registration {
        first_name: validation::text("First name", &form.first_name)?,
        last_name: validation::text("Last name", &form.last_name)?,
        email: validation::email(&form.email)?,
        // checked for blankness, stored as typed
        password: {
            validation::required("Password", &form.password)?;
            form.password
        },
    })
}

/// Stores a new unverified user and mails the verification link. A mail
/// failure is logged; the registration itself stands.
pub async fn register(state: &AppState, form: RegisterForm) -> Result<User, AppError> {
    let reg = validate_registration(form)?;

    let mut session = state.store.begin().await?;
    if session.find_user_by_email(&reg.email).await?.is_some() {
        warn!(email = %reg.email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let user = User {
        id: Uuid::new_v4(),
        first_name: reg.first_name,
        last_name: reg.last_name,
        email: reg.email,
        password: hash_password(&reg.password)?,
        verified: false,
    };
    session.insert_user(&user).await?;
    session.commit().await?;
    drop(session);
    info!(user_id = %user.id, email = %user.email, "user registered");

    send_verification(state, &user).await;
    Ok(user)
}

async fn send_verification(state: &AppState, user: &User) {
    let keys = JwtKeys::new(&state.config.jwt);
    let token = match keys.sign_verification(user.id) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, user_id = %user.id, "verification token signing failed");
            return;
        }
    };
    let link = format!("{}/verify?token={}", state.config.public_base_url, token);
    if let Err(e) = state.mailer.send(verification_email(user, &link)).await {
        tracing::error!(error = ?e, user_id = %user.id, "verification email failed");
    }
}

/// Checks credentials and issues an auth token. The admin claim is granted
/// only for the configured admin credentials.
pub async fn login(state: &AppState, form: LoginForm) -> Result<(String, User), AppError> {
    let email = validation::email(&form.email)?;
    validation::required("Password", &form.password)?;

    let mut session = state.store.begin().await?;
    let user = session
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| {
            warn!(email = %email, "login unknown email");
            AppError::NotFound("User doesn't exist in the DB".into())
        })?;
    drop(session);

    if !verify_password(&form.password, &user.password)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized("Invalid password!".into()));
    }

    let admin = state.config.is_admin_login(&email, &form.password);
    let token = JwtKeys::new(&state.config.jwt).sign_auth(&user, admin)?;
    info!(user_id = %user.id, admin, "user logged in");
    Ok((token, user))
}

/// Marks the token's subject as verified.
pub async fn verify(state: &AppState, token: Option<&str>) -> Result<Uuid, AppError> {
    let token = token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("No verification token provided.".into()))?;

    let claims = JwtKeys::new(&state.config.jwt)
        .verify_verification(token)
        .map_err(|e| match e {
            TokenError::Expired => AppError::TokenExpired("Verification link expired.".into()),
            TokenError::InvalidSignature => {
                AppError::Unauthorized("Invalid verification token signature.".into())
            }
            TokenError::Malformed | TokenError::WrongKind => {
                AppError::Unauthorized("Invalid or missing verification token.".into())
            }
        })?;

    let mut session = state.store.begin().await?;
    if !session.set_user_verified(claims.sub).await? {
        return Err(AppError::NotFound(format!(
            "User with uuid {} doesn't exist in the DB!",
            claims.sub
        )));
    }
    session.commit().await?;
    info!(user_id = %claims.sub, "user verified");
    Ok(claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::claims::{TokenKind, VerificationClaims},
        mailer::tests::RecordingMailer,
        state::tests::{fake, fake_with_mailer, ADMIN_EMAIL, ADMIN_PASSWORD},
    };

    fn form(email: &str) -> RegisterForm {
        RegisterForm {
            first_name: "Jane".into(),
            last_name: "Smith".into(),
            email: email.into(),
            password: "s3cret-pass".into(),
        }
    }

    fn token_from_link(html: &str) -> String {
        let start = html.find("token=").expect("link present") + "token=".len();
        html[start..]
            .chars()
            .take_while(|c| *c != '"')
            .collect()
    }

    #[test]
    fn validation_reports_first_blank_field() {
        let err = validate_registration(RegisterForm {
            first_name: " ".into(),
            ..form("jane@example.com")
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "First name cannot be empty!");

        let err = validate_registration(form("not-an-email")).unwrap_err();
        assert_eq!(err.status().as_u16(), 400);

        let err = validate_registration(RegisterForm {
            password: String::new(),
            ..form("jane@example.com")
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Password cannot be empty!");

        let err = validate_registration(RegisterForm {
            first_name: "J".repeat(256),
            ..form("jane@example.com")
        })
        .unwrap_err();
        assert_eq!(err.status().as_u16(), 400);
        assert_eq!(err.to_string(), "First name is too long!");
    }

    #[tokio::test]
    async fn register_hashes_password_and_sends_link() {
        let (state, store, mailer) = fake();
        let user = register(&state, form(" Jane@Example.com ")).await.unwrap();

        let stored = store.user(user.id).unwrap();
        assert_eq!(stored.email, "jane@example.com");
        assert_ne!(stored.password, "s3cret-pass");
        assert!(verify_password("s3cret-pass", &stored.password).unwrap());
        assert!(!stored.verified);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "jane@example.com");
        assert!(sent[0].html.contains("http://localhost:8080/verify?token="));
        assert_eq!(store.open_sessions(), 0);
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let (state, store, _) = fake();
        register(&state, form("jane@example.com")).await.unwrap();
        let err = register(&state, form("JANE@example.com")).await.unwrap_err();
        assert_eq!(err.status().as_u16(), 409);
        assert_eq!(store.user_count(), 1);
        assert_eq!(store.open_sessions(), 0);
    }

    #[tokio::test]
    async fn mail_failure_does_not_fail_registration() {
        let (state, store, _) = fake_with_mailer(RecordingMailer::failing());
        register(&state, form("jane@example.com")).await.unwrap();
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn login_outcomes() {
        let (state, _, _) = fake();
        let user = register(&state, form("jane@example.com")).await.unwrap();

        let missing = login(
            &state,
            LoginForm { email: "nobody@example.com".into(), password: "x".into() },
        )
        .await
        .unwrap_err();
        assert_eq!(missing.status().as_u16(), 404);

        let wrong = login(
            &state,
            LoginForm { email: "jane@example.com".into(), password: "nope".into() },
        )
        .await
        .unwrap_err();
        assert_eq!(wrong.status().as_u16(), 401);

        let (token, logged_in) = login(
            &state,
            LoginForm { email: "jane@example.com".into(), password: "s3cret-pass".into() },
        )
        .await
        .unwrap();
        assert_eq!(logged_in.id, user.id);
        let claims = JwtKeys::new(&state.config.jwt).verify_auth(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert!(!claims.admin);
    }

    #[tokio::test]
    async fn admin_credentials_earn_admin_claim() {
        let (state, store, _) = fake();
        store.seed_user(User {
            id: Uuid::new_v4(),
            first_name: "Ada".into(),
            last_name: "Admin".into(),
            email: ADMIN_EMAIL.into(),
            password: hash_password(ADMIN_PASSWORD).unwrap(),
            verified: true,
        });
        let (token, _) = login(
            &state,
            LoginForm { email: ADMIN_EMAIL.into(), password: ADMIN_PASSWORD.into() },
        )
        .await
        .unwrap();
        assert!(JwtKeys::new(&state.config.jwt).verify_auth(&token).unwrap().admin);
    }

    #[tokio::test]
    async fn verification_link_flips_flag() {
        let (state, store, mailer) = fake();
        let user = register(&state, form("jane@example.com")).await.unwrap();
        let token = token_from_link(&mailer.sent()[0].html);

        assert_eq!(verify(&state, Some(&token)).await.unwrap(), user.id);
        assert!(store.user(user.id).unwrap().verified);
    }

    #[tokio::test]
    async fn verification_failures() {
        let (state, _, _) = fake();
        let keys = JwtKeys::new(&state.config.jwt);

        let err = verify(&state, None).await.unwrap_err();
        assert_eq!(err.status().as_u16(), 401);

        let err = verify(&state, Some("garbage")).await.unwrap_err();
        assert_eq!(err.status().as_u16(), 401);

        let unknown = keys.sign_verification(Uuid::new_v4()).unwrap();
        let err = verify(&state, Some(&unknown)).await.unwrap_err();
        assert_eq!(err.status().as_u16(), 404);

        let now = time::OffsetDateTime::now_utc().unix_timestamp() as usize;
        let expired = keys
            .encode(&VerificationClaims {
                sub: Uuid::new_v4(),
                iat: now - 7200,
                exp: now - 3600,
                iss: keys.issuer().to_string(),
                kind: TokenKind::Verification,
            })
            .unwrap();
        let err = verify(&state, Some(&expired)).await.unwrap_err();
        assert_eq!(err.status().as_u16(), 498);

        // validly signed but carrying no subject
        let anonymous = keys
            .encode(&serde_json::json!({
                "iat": now,
                "exp": now + 3600,
                "iss": keys.issuer(),
                "kind": "verification",
            }))
            .unwrap();
        let err = verify(&state, Some(&anonymous)).await.unwrap_err();
        assert_eq!(err.status().as_u16(), 401);
        assert_eq!(err.to_string(), "Invalid or missing verification token.");
    }
}
