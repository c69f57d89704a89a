use update_server::config::Config;
use update_server::core::{Branch, UpdateResult};
use update_server::di::ServiceContainer;

pub async fn run(config: Config, branch: Option<Branch>) -> UpdateResult<()> {
    let container = ServiceContainer::new(config).await?;
    let coordinator = container.coordinator()?;

    let branches = match branch {
        Some(branch) => vec![branch],
        None => coordinator.branches(),
    };

    if branches.is_empty() {
        println!("No branches configured.");
        return Ok(());
    }

    for branch in branches {
        println!("Refreshing {}...", branch);
        if coordinator.run_now(branch).await? {
            println!("  ✓ New release stored");
        } else {
            println!("  Up to date");
        }
    }

    Ok(())
}
