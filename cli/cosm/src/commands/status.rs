//! `cosm status` — show the project in the current directory.

use std::path::Path;

use anyhow::Result;
use cosm_registry::Project;

/// Render the project summary printed by `cosm status`.
pub(crate) fn render(project: &Project) -> String {
    let mut out = format!("Project: {} {}\n", project.name, project.version);
    if let Some(language) = &project.language {
        out.push_str(&format!("Language: {language}\n"));
    }
    if project.dependencies.is_empty() {
        out.push_str("No dependencies.\n");
        return out;
    }
    out.push_str("Dependencies:\n");
    for dep in &project.dependencies {
        let mode = if dep.develop { " (develop)" } else { "" };
        out.push_str(&format!("  - {} {}{mode}\n", dep.name, dep.version));
    }
    out
}

pub fn run(project_dir: &Path) -> Result<()> {
    let project = Project::load(project_dir)?;
    print!("{}", render(&project));
    Ok(())
}
