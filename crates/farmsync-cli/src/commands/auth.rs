use crate::commands::common::{open_client, read_piped_stdin};
use crate::error::CliError;
use crate::settings::Overrides;

pub async fn run_login(
    username: &str,
    password: Option<String>,
    overrides: &Overrides,
) -> Result<(), CliError> {
    let password = match password.filter(|password| !password.is_empty()) {
        Some(password) => password,
        None => read_piped_stdin()?.ok_or(CliError::MissingPassword)?,
    };

    let client = open_client(overrides).await?;
    let session = client.login(username, &password).await?;
    println!("Signed in as {}", session.user.username);
    Ok(())
}

pub async fn run_refresh(overrides: &Overrides) -> Result<(), CliError> {
    let client = open_client(overrides).await?;
    let session = client.refresh_session().await?;
    println!("Session renewed for {}", session.user.username);
    Ok(())
}

pub async fn run_logout(overrides: &Overrides) -> Result<(), CliError> {
    let client = open_client(overrides).await?;
    if client.session().is_authenticated() {
        client.logout().await?;
        println!("Signed out");
    } else {
        println!("Not signed in");
    }
    Ok(())
}

pub async fn run_whoami(overrides: &Overrides) -> Result<(), CliError> {
    let client = open_client(overrides).await?;
    match client.session().current() {
        Some(session) => {
            let user = &session.user;
            let name = format!("{} {}", user.first_name, user.last_name);
            let name = name.trim();
            if name.is_empty() {
                println!("{} ({})", user.username, user.role.as_str());
            } else {
                println!("{} - {name} ({})", user.username, user.role.as_str());
            }
        }
        None => println!("Not signed in"),
    }
    Ok(())
}
