use rxsync_core::token::{AuthToken, FileTokenStore, TokenStore};

use crate::cli::TokenCommands;
use crate::commands::common::AppOptions;
use crate::error::CliError;

pub fn run_token(command: TokenCommands, options: &AppOptions) -> Result<(), CliError> {
    let store = FileTokenStore::new(&options.token_path);

    match command {
        TokenCommands::Set { value } => {
            let token = AuthToken::new(value);
            if token.is_empty() {
                return Err(CliError::EmptyToken);
            }
            store.save(&token)?;
            println!("Token stored");
        }
        TokenCommands::Clear => {
            store.clear()?;
            println!("Token cleared");
        }
        TokenCommands::Show => match store.load()? {
            Some(_) => println!("A token is stored"),
            None => println!("No token stored"),
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rxsync_core::token::{FileTokenStore, TokenStore};

    use super::*;

    fn options_with_token_path(path: std::path::PathBuf) -> AppOptions {
        AppOptions {
            db_path: std::path::PathBuf::from(":memory:"),
            api_url: None,
            token_path: path,
        }
    }

    #[test]
    fn set_show_clear_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let options = options_with_token_path(dir.path().join("token.json"));

        run_token(
            TokenCommands::Set {
                value: "  secret  ".to_string(),
            },
            &options,
        )
        .unwrap();

        let store = FileTokenStore::new(&options.token_path);
        assert_eq!(store.load().unwrap().unwrap().as_str(), "secret");

        run_token(TokenCommands::Clear, &options).unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn set_rejects_blank_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let options = options_with_token_path(dir.path().join("token.json"));

        let error = run_token(
            TokenCommands::Set {
                value: "   ".to_string(),
            },
            &options,
        )
        .unwrap_err();
        assert!(matches!(error, CliError::EmptyToken));
    }
}
