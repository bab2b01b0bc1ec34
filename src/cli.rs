use clap::Parser;
use uuid::Uuid;

#[derive(Parser, Debug, Default)]
#[command(name = "luzon", version, about = "Track your project hours")]
pub struct Cli {
    /// Open with this project selected (the target of a share link)
    #[arg(long)]
    pub project: Option<Uuid>,

    /// Forget the logged-in user and exit
    #[arg(long)]
    pub logout: bool,

    /// Apply database migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_project_link() {
        let id = Uuid::new_v4();
        let cli = Cli::try_parse_from(["luzon", "--project", &id.to_string()]).unwrap();
        assert_eq!(cli.project, Some(id));
        assert!(!cli.logout);
    }

    #[test]
    fn rejects_bad_project_id() {
        assert!(Cli::try_parse_from(["luzon", "--project", "abc"]).is_err());
    }
}
