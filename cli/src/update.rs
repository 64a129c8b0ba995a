//! Self-update against GitHub releases, plus the background version
//! check the `version` command piggybacks on.

use colored::Colorize;
use self_update::backends::github::ReleaseList;
use self_update::cargo_crate_version;
use semver::Version;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const REPO_OWNER: &str = "iyulab";
const REPO_NAME: &str = "docfmt";
const BIN_NAME: &str = "docfmt";
const CLI_CRATE_NAME: &str = "docfmt-cli";

/// How long `version` waits for the background release check.
const VERSION_CHECK_WAIT: Duration = Duration::from_millis(500);

/// Latest release compared against the running binary.
pub struct UpdateCheckResult {
    pub has_update: bool,
    pub latest_version: String,
    pub current_version: String,
}

/// Kick off a release check on a background thread.
///
/// The receiver yields `None` when the check fails (offline, rate
/// limited, unparseable tag); callers treat that as "nothing to say".
pub fn check_update_async() -> mpsc::Receiver<Option<UpdateCheckResult>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(compare_with_latest().ok());
    });
    rx
}

/// Collect the background check result without stalling the command.
pub fn try_get_update_result(
    rx: &mpsc::Receiver<Option<UpdateCheckResult>>,
) -> Option<UpdateCheckResult> {
    rx.recv_timeout(VERSION_CHECK_WAIT).ok().flatten()
}

/// Print a one-line upgrade hint when a newer release exists.
pub fn print_update_notification(result: &UpdateCheckResult) {
    if result.has_update {
        println!();
        println!(
            "{} {} → {} available! Run '{}' to update.",
            "Update:".yellow().bold(),
            result.current_version,
            result.latest_version.green(),
            "docfmt update".cyan()
        );
    }
}

fn fetch_releases() -> Result<Vec<self_update::update::Release>, Box<dyn std::error::Error>> {
    let releases = ReleaseList::configure()
        .repo_owner(REPO_OWNER)
        .repo_name(REPO_NAME)
        .build()?
        .fetch()?;
    Ok(releases)
}

fn compare_with_latest() -> Result<UpdateCheckResult, Box<dyn std::error::Error>> {
    let current_version = cargo_crate_version!();
    let releases = fetch_releases()?;
    let latest = releases.first().ok_or("no releases")?;
    let latest_version = latest.version.trim_start_matches('v').to_string();

    let current = Version::parse(current_version)?;
    let latest_ver = Version::parse(&latest_version)?;

    Ok(UpdateCheckResult {
        has_update: latest_ver > current,
        latest_version,
        current_version: current_version.to_string(),
    })
}

/// Binaries under ~/.cargo/bin were installed with `cargo install`;
/// replacing them behind cargo's back leaves its metadata stale.
fn is_cargo_install() -> bool {
    std::env::current_exe()
        .map(|exe| {
            let path = exe.to_string_lossy();
            path.contains(".cargo") && path.contains("bin")
        })
        .unwrap_or(false)
}

/// The `update` command: report, and unless `check_only`, download the
/// release asset for this platform and replace the running binary.
pub fn run_update(check_only: bool, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let current_version = cargo_crate_version!();
    println!("{} {}", "Current version:".cyan().bold(), current_version);
    println!("{}", "Checking for updates...".cyan());

    let releases = fetch_releases()?;
    let Some(latest) = releases.first() else {
        println!("{}", "No releases found on GitHub.".yellow());
        return Ok(());
    };
    let latest_version = latest.version.trim_start_matches('v');
    println!("{} {}", "Latest version:".cyan().bold(), latest_version);

    let current = Version::parse(current_version)?;
    let latest_ver = Version::parse(latest_version)?;

    if current >= latest_ver && !force {
        println!();
        println!("{} You are running the latest version!", "✓".green().bold());
        return Ok(());
    }

    if current < latest_ver {
        println!();
        println!(
            "{} New version available: {} → {}",
            "↑".yellow().bold(),
            current_version.yellow(),
            latest_version.green().bold()
        );
    }

    let cargo_managed = is_cargo_install();

    if check_only || cargo_managed {
        println!();
        if cargo_managed {
            println!(
                "{} Installed via cargo. Please run:",
                "Note:".yellow().bold()
            );
            println!(
                "  {}",
                format!("cargo install {}", CLI_CRATE_NAME).cyan().bold()
            );
        } else {
            println!("Run '{}' to update.", "docfmt update".cyan());
        }
        return Ok(());
    }

    println!();
    println!("{}", "Downloading update...".cyan());

    let os_str = std::env::consts::OS;
    let arch_str = std::env::consts::ARCH;
    let target_asset = latest
        .assets
        .iter()
        .find(|asset| {
            asset.name.starts_with("docfmt-")
                && asset.name.contains(os_str)
                && asset.name.contains(arch_str)
        })
        .ok_or_else(|| format!("No CLI asset found for {}-{}", os_str, arch_str))?;

    println!("{} {}", "Found asset:".dimmed(), target_asset.name.dimmed());

    // The API asset URL needs an Accept header; the public download URL
    // does not.
    let download_url = format!(
        "https://github.com/{}/{}/releases/download/v{}/{}",
        REPO_OWNER, REPO_NAME, latest_version, target_asset.name
    );

    let tmp_dir = self_update::TempDir::new()?;
    let tmp_archive_path = tmp_dir.path().join(&target_asset.name);
    let mut tmp_archive = std::fs::File::create(&tmp_archive_path)?;

    let mut download = self_update::Download::from_url(&download_url);
    download.show_progress(true);
    download.download_to(&mut tmp_archive)?;

    print!("Extracting archive... ");
    std::io::Write::flush(&mut std::io::stdout())?;
    let bin_name = format!("{}{}", BIN_NAME, std::env::consts::EXE_SUFFIX);
    self_update::Extract::from_source(&tmp_archive_path).extract_file(tmp_dir.path(), &bin_name)?;
    println!("Done");

    print!("Replacing binary file... ");
    std::io::Write::flush(&mut std::io::stdout())?;
    let new_exe = tmp_dir.path().join(&bin_name);
    self_update::self_replace::self_replace(new_exe)?;
    println!("Done");

    println!();
    println!(
        "{} Successfully updated to v{}!",
        "✓".green().bold(),
        latest_version
    );
    println!();
    println!("Restart docfmt to use the new version.");

    Ok(())
}
