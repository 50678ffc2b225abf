//! Build automation tasks for plazas
//!
//! - Generating the CLI reference from the clap definitions

use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for plazas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate the CLI reference in Markdown
    GenerateCliDocs {
        /// Output directory for generated documentation
        #[arg(short, long, default_value = "docs")]
        output_dir: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenerateCliDocs { output_dir } => generate_cli_docs(&output_dir)?,
    }

    Ok(())
}

fn generate_cli_docs(output_dir: &str) -> anyhow::Result<()> {
    println!("Generating CLI documentation...");

    let markdown = clap_markdown::help_markdown::<plazas_cli::Cli>();

    let content = format!(
        r#"# plazas CLI Reference

Generated from the CLI source code on {}.

## Overview

`plazas` loads the residency placements CSV into a local SQLite store and
answers filtered, paginated queries over it. The store is rebuilt
automatically whenever the CSV is newer than it.

## Quick Start

```bash
# Check the source file without building anything
plazas validate --source plazas.csv

# Build (or reuse) the store
plazas ingest

# Cardiology in Andalusia for the 2025 cycle, 50 rows per page
plazas query --specialty CARDIOLOGÍA --ccaa ANDALUCÍA --year 2025 --page-size 50

# Same filters, exported
plazas query --specialty CARDIOLOGÍA --year 2025 --output plazas_filtradas.csv

# Best three placements per specialty
plazas top --year 2025 --specialty CARDIOLOGÍA --specialty PEDIATRÍA
```

## Commands

{}

## Configuration

Settings are resolved in this order, later sources winning:

1. Built-in defaults (`plazas_orden_ultimo_ano.csv`, store next to it, 200 rows per page)
2. `plazas.toml` in the working directory, or the file given with `--config`
3. `PLAZAS_SOURCE`, `PLAZAS_STORE` and `PLAZAS_PAGE_SIZE` (a `.env` file is read too)
4. Command-line flags

```toml
source = "data/plazas.csv"
store = "data/plazas.db"
page_size = 100
```

## Logging

Logs go to stderr. `--verbose` enables debug output; `PLAZAS_LOG_LEVEL`,
`PLAZAS_LOG_FORMAT` and `RUST_LOG` override it.

---

*To update, run `cargo xtask generate-cli-docs`.*
"#,
        chrono::Utc::now().format("%Y-%m-%d"),
        markdown
    );

    let output_path = PathBuf::from(output_dir);
    fs::create_dir_all(&output_path)?;

    let file_path = output_path.join("cli-reference.md");
    fs::write(&file_path, content)?;

    println!("✅ Generated CLI documentation at: {}", file_path.display());

    Ok(())
}
