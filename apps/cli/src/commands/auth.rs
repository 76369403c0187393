//! Sign in, sign up and who-am-I.

use std::io::{BufRead, Write};

use mandi_client::{ClientResult, Credentials, SignupOutcome, SignupRequest, Storefront};
use secrecy::SecretString;

/// Prompts on stderr and reads one line from stdin.
fn read_password(given: Option<String>) -> ClientResult<String> {
    if let Some(password) = given {
        return Ok(password);
    }

    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub async fn login(app: &Storefront, email: String, password: Option<String>) -> ClientResult<()> {
    let password = read_password(password)?;
    let user = app
        .session
        .login(&Credentials::new(email, password))
        .await?;

    println!("Signed in as {} <{}>", user.name, user.email);
    Ok(())
}

pub async fn signup(
    app: &Storefront,
    name: String,
    email: String,
    location: String,
    contact_number: String,
    password: Option<String>,
) -> ClientResult<()> {
    let request = SignupRequest {
        name,
        email,
        password: SecretString::from(read_password(password)?),
        location,
        contact_number,
    };

    match app.session.signup(&request).await? {
        SignupOutcome::SignedIn(user) => println!("Welcome, {}! You are signed in.", user.name),
        SignupOutcome::Created(user) => println!(
            "Account created for {}. Sign in with `mandi login -e {}`.",
            user.name, user.email
        ),
    }
    Ok(())
}

pub async fn whoami(app: &Storefront) -> ClientResult<()> {
    match app.session.session().await {
        Some(session) if !session.is_expired() => {
            let user = match session.user() {
                Some(user) => user.clone(),
                None => app.session.refresh_user().await?,
            };
            println!("{} <{}> ({})", user.name, user.email, user.role);
            println!("Session valid until {}", session.expires_at().format("%d %b %Y %H:%M UTC"));
        }
        _ => println!("Not signed in."),
    }
    Ok(())
}
