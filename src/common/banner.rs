const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[2m";

pub struct BannerInfo {
    pub version: &'static str,
    pub branch: &'static str,
    pub commit: &'static str,
    pub profile: &'static str,
}

impl Default for BannerInfo {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            branch: option_env!("GIT_BRANCH").unwrap_or("unknown"),
            commit: option_env!("GIT_COMMIT").unwrap_or("unknown"),
            profile: if cfg!(debug_assertions) {
                "debug"
            } else {
                "release"
            },
        }
    }
}

pub fn print_banner(info: &BannerInfo, station_name: &str) {
    crate::log_println!();
    crate::log_println!("{GREEN}   ___          __                       ___    {RESET}");
    crate::log_println!("{GREEN}  / _ \\__ _____/ /____ ________ ____/ (_)__  {RESET}");
    crate::log_println!("{GREEN} / , _/ // (_-< __/ _ `/ __/ _ `/ _  / / _ \\ {RESET}");
    crate::log_println!("{GREEN}/_/|_|\\_,_/___|__/\\_,_/_/  \\_,_/\\_,_/_/\\___/ {RESET}");
    crate::log_println!("{DIM}========================================{RESET}");
    crate::log_println!();

    print_row("Station", station_name, CYAN);
    print_row("Version", info.version, CYAN);
    print_row("Branch", info.branch, RESET);
    print_row("Commit", info.commit, RESET);
    print_row("Profile", info.profile, YELLOW);
    crate::log_println!();
}

fn print_row(label: &str, value: &str, color: &str) {
    crate::log_println!("  {BOLD}{label:<10}{RESET}{color}{value}{RESET}");
}
