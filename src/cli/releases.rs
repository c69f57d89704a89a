use update_server::config::Config;
use update_server::core::{Branch, UpdateResult};
use update_server::di::ServiceContainer;

pub async fn run(config: Config, branch: Branch) -> UpdateResult<()> {
    let container = ServiceContainer::new(config).await?;
    let releases = container.store.list_releases(branch).await?;

    if releases.is_empty() {
        println!("No releases stored for {}.", branch);
        return Ok(());
    }

    println!("Releases on {}:", branch);
    for release in releases {
        let artifacts = container.store.artifacts_for_release(release.id).await?;
        let platforms: Vec<String> = artifacts.iter().map(|a| a.platform.to_string()).collect();

        println!(
            "  {} ({})  {}",
            release.version,
            release.release_date.format("%Y-%m-%d %H:%M"),
            platforms.join(", ")
        );
    }

    Ok(())
}
