use clap::Subcommand;
use diesel::sqlite::SqliteConnection;
use portal_web::models::{AppUser, Role};
use portal_web::orm::app_user::{
    insert_app_user, insert_app_user_if_absent, list_app_users, update_password_hash,
};
use portal_web::orm::login::hash_password;
use regex::Regex;
use rpassword::read_password;
use std::io::{self, Write};

/// Accounts created by `seed-defaults`.
const DEFAULT_ACCOUNTS: [(&str, &str, Role); 2] = [
    ("admin", "test123", Role::Admin),
    ("viewer", "viewer123", Role::Viewer),
];

#[derive(Subcommand)]
pub enum UserAction {
    #[command(about = "Add a new account")]
    Add {
        #[arg(short, long, help = "Login name")]
        username: String,
        #[arg(short, long, help = "Password (will be prompted securely if not provided)")]
        password: Option<String>,
        #[arg(short, long, default_value = "viewer", help = "Role: admin or viewer")]
        role: String,
    },
    #[command(about = "Change an account's password")]
    ChangePassword {
        #[arg(short, long, help = "Login name")]
        username: String,
        #[arg(short, long, help = "New password (will be prompted securely if not provided)")]
        password: Option<String>,
    },
    #[command(about = "List accounts, optionally filtered by search term")]
    Ls {
        #[arg(help = "Search term (regex by default, use -F for fixed string)")]
        search_term: Option<String>,
        #[arg(short = 'F', long = "fixed-string", help = "Treat search term as fixed string instead of regex")]
        fixed_string: bool,
    },
    #[command(about = "Create the default admin and viewer accounts if they are missing")]
    SeedDefaults,
}

pub fn handle_user_command_with_conn(
    conn: &mut SqliteConnection,
    action: UserAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        UserAction::Add { username, password, role } => {
            add_user_impl(conn, &username, password, &role)?;
        }
        UserAction::ChangePassword { username, password } => {
            change_password_impl(conn, &username, password)?;
        }
        UserAction::Ls { search_term, fixed_string } => {
            list_users_impl(conn, search_term, fixed_string)?;
        }
        UserAction::SeedDefaults => {
            seed_defaults_impl(conn)?;
        }
    }
    Ok(())
}

pub fn add_user_impl(
    conn: &mut SqliteConnection,
    username: &str,
    password: Option<String>,
    role: &str,
) -> Result<AppUser, Box<dyn std::error::Error>> {
    let role: Role = role.parse()?;
    let password = match password {
        Some(p) => p,
        None => prompt_for_password()?,
    };

    let password_hash =
        hash_password(&password).map_err(|e| format!("Failed to hash password: {}", e))?;
    let created = insert_app_user(conn, username, &password_hash, role)?;

    println!("User created successfully!");
    println!("ID: {}", created.id);
    println!("Username: {}", created.username);
    println!("Role: {}", created.role);

    Ok(created)
}

pub fn change_password_impl(
    conn: &mut SqliteConnection,
    username: &str,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let password = match password {
        Some(p) => p,
        None => prompt_for_password()?,
    };

    let password_hash =
        hash_password(&password).map_err(|e| format!("Failed to hash password: {}", e))?;
    if update_password_hash(conn, username, &password_hash)? == 0 {
        return Err(format!("No user named '{}'", username).into());
    }

    println!("Password changed successfully for user: {}", username);
    Ok(())
}

pub fn list_users_impl(
    conn: &mut SqliteConnection,
    search_term: Option<String>,
    fixed_string: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let users = filter_users(list_app_users(conn)?, search_term.as_deref(), fixed_string)?;

    if users.is_empty() {
        println!("No users found.");
    } else {
        println!("Users:");
        for user in users {
            println!("  ID: {}, Username: {}, Role: {}", user.id, user.username, user.role);
        }
    }

    Ok(())
}

/// Keeps the accounts whose username matches `search_term`.
pub fn filter_users(
    users: Vec<AppUser>,
    search_term: Option<&str>,
    fixed_string: bool,
) -> Result<Vec<AppUser>, Box<dyn std::error::Error>> {
    let Some(term) = search_term else {
        return Ok(users);
    };

    if fixed_string {
        return Ok(users.into_iter().filter(|user| user.username.contains(term)).collect());
    }

    let regex =
        Regex::new(term).map_err(|e| format!("Invalid regex pattern '{}': {}", term, e))?;
    Ok(users.into_iter().filter(|user| regex.is_match(&user.username)).collect())
}

/// Returns the usernames that were created; existing accounts keep their passwords.
pub fn seed_defaults_impl(
    conn: &mut SqliteConnection,
) -> Result<Vec<&'static str>, Box<dyn std::error::Error>> {
    let mut created = Vec::new();
    for (username, password, role) in DEFAULT_ACCOUNTS {
        let password_hash =
            hash_password(password).map_err(|e| format!("Failed to hash password: {}", e))?;
        if insert_app_user_if_absent(conn, username, &password_hash, role)? {
            println!("Created {} account '{}'", role, username);
            created.push(username);
        } else {
            println!("Account '{}' already exists, leaving it alone", username);
        }
    }
    Ok(created)
}

pub fn prompt_for_password() -> Result<String, Box<dyn std::error::Error>> {
    print!("Enter new password: ");
    io::stdout().flush()?;
    let password = read_password()?;

    if password.is_empty() {
        return Err("Password cannot be empty".into());
    }

    print!("Confirm new password: ");
    io::stdout().flush()?;
    let confirm_password = read_password()?;

    if password != confirm_password {
        return Err("Passwords do not match".into());
    }

    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_web::orm::app_user::get_app_user_by_username;
    use portal_web::orm::login::verify_password;
    use portal_web::orm::testing::setup_test_db;

    fn account(id: i32, username: &str) -> AppUser {
        AppUser {
            id,
            username: username.to_string(),
            password_hash: String::new(),
            role: "viewer".to_string(),
        }
    }

    #[test]
    fn test_add_user_with_role() {
        let mut conn = setup_test_db();

        let created = add_user_impl(&mut conn, "ada", Some("secret".to_string()), "ADMIN")
            .expect("add user");
        assert!(created.is_admin());

        let stored = get_app_user_by_username(&mut conn, "ada")
            .expect("query")
            .expect("user exists");
        assert!(verify_password("secret", &stored.password_hash));
    }

    #[test]
    fn test_add_user_rejects_unknown_role() {
        let mut conn = setup_test_db();
        let result = add_user_impl(&mut conn, "ada", Some("secret".to_string()), "owner");
        assert!(result.is_err());
        assert!(list_app_users(&mut conn).expect("list").is_empty());
    }

    #[test]
    fn test_change_password() {
        let mut conn = setup_test_db();
        add_user_impl(&mut conn, "ada", Some("old".to_string()), "viewer").expect("add user");

        change_password_impl(&mut conn, "ada", Some("new".to_string())).expect("change");
        let stored = get_app_user_by_username(&mut conn, "ada")
            .expect("query")
            .expect("user exists");
        assert!(verify_password("new", &stored.password_hash));
        assert!(!verify_password("old", &stored.password_hash));

        assert!(change_password_impl(&mut conn, "ghost", Some("x".to_string())).is_err());
    }

    #[test]
    fn test_filter_users() {
        let users = || vec![account(1, "admin"), account(2, "viewer"), account(3, "a.b")];

        assert_eq!(filter_users(users(), None, false).expect("filter").len(), 3);

        let regex = filter_users(users(), Some("^a"), false).expect("filter");
        assert_eq!(regex.iter().map(|u| u.id).collect::<Vec<_>>(), vec![1, 3]);

        // "." is a wildcard as a regex but literal with -F
        assert_eq!(filter_users(users(), Some("."), false).expect("filter").len(), 3);
        let fixed = filter_users(users(), Some("."), true).expect("filter");
        assert_eq!(fixed.iter().map(|u| u.id).collect::<Vec<_>>(), vec![3]);

        assert!(filter_users(users(), Some("("), false).is_err());
    }

    #[test]
    fn test_seed_defaults_is_idempotent() {
        let mut conn = setup_test_db();

        assert_eq!(seed_defaults_impl(&mut conn).expect("seed"), vec!["admin", "viewer"]);
        change_password_impl(&mut conn, "viewer", Some("changed".to_string())).expect("change");

        assert!(seed_defaults_impl(&mut conn).expect("seed").is_empty());
        let viewer = get_app_user_by_username(&mut conn, "viewer")
            .expect("query")
            .expect("viewer exists");
        assert!(verify_password("changed", &viewer.password_hash));
        assert_eq!(viewer.role(), Some(Role::Viewer));
    }
}
