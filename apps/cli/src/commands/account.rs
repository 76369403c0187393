//! Profile page.

use mandi_client::{ClientResult, ProfileUpdate, Storefront};
use mandi_core::User;

fn print_user(user: &User) {
    println!("Name:     {}", user.name);
    println!("Email:    {}", user.email);
    println!("Location: {}", user.location.as_deref().unwrap_or("-"));
    println!("Phone:    {}", user.contact_number.as_deref().unwrap_or("-"));
    println!("Role:     {}", user.role);
}

pub async fn show(app: &Storefront) -> ClientResult<()> {
    let user = app.profile.get().await?;
    print_user(&user);
    Ok(())
}

pub async fn update(
    app: &Storefront,
    name: Option<String>,
    email: Option<String>,
    location: Option<String>,
    contact_number: Option<String>,
) -> ClientResult<()> {
    let changes = ProfileUpdate {
        name,
        email,
        location,
        contact_number,
    };
    if changes.is_empty() {
        println!("Nothing to change.");
        return Ok(());
    }

    let user = app.profile.update(&changes).await?;
    println!("Profile updated.");
    print_user(&user);
    Ok(())
}
