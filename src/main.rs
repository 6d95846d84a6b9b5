//! face-export - character asset export tool
//!
//! Converts a scene snapshot (JSON dumped by the authoring tool) into the
//! engine's face.bin binary asset: skinned mesh, skeleton, animation clip,
//! and collision hulls.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use face_export::{export, ExportConfig, SceneSnapshot};

#[derive(Parser)]
#[command(name = "face-export")]
#[command(about = "Face asset export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a scene snapshot to face.bin
    Export {
        /// Input scene snapshot (JSON)
        scene: PathBuf,

        /// Output file path
        #[arg(short, long, default_value = "face.bin")]
        output: PathBuf,

        /// TOML file with export settings
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Head-attachment bone name (overrides config)
        #[arg(long)]
        head_joint: Option<String>,

        /// Uniform source-to-engine scale (overrides config)
        #[arg(long)]
        scale: Option<f32>,

        /// Bone influences per vertex (overrides config)
        #[arg(long)]
        weights: Option<usize>,
    },

    /// Validate a scene snapshot without writing output
    Check {
        /// Input scene snapshot (JSON)
        scene: PathBuf,

        /// TOML file with export settings
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List bones and the action frame range of a scene snapshot
    Bones {
        /// Input scene snapshot (JSON)
        scene: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            scene,
            output,
            config,
            head_joint,
            scale,
            weights,
        } => {
            let config = resolve_config(config.as_deref(), head_joint, scale, weights)?;
            let mut snapshot = SceneSnapshot::load(&scene)?;
            tracing::info!("Exporting {:?} -> {:?}", scene, output);
            export::export_face_to_file(&mut snapshot, &config, &output)?;
            tracing::info!("Done!");
        }

        Commands::Check { scene, config } => {
            let config = resolve_config(config.as_deref(), None, None, None)?;
            let mut snapshot = SceneSnapshot::load(&scene)?;
            tracing::info!("Checking {:?}", scene);
            export::check_scene(&mut snapshot, &config)?;
        }

        Commands::Bones { scene } => {
            let snapshot = SceneSnapshot::load(&scene)?;
            list_bones(&snapshot);
        }
    }

    Ok(())
}

/// Merge the optional config file with CLI overrides
fn resolve_config(
    path: Option<&Path>,
    head_joint: Option<String>,
    scale: Option<f32>,
    weights: Option<usize>,
) -> Result<ExportConfig> {
    let mut config = match path {
        Some(path) => ExportConfig::load(path)?,
        None => ExportConfig::default(),
    };
    if let Some(head_joint) = head_joint {
        config.head_joint = head_joint;
    }
    if let Some(scale) = scale {
        config.scale = scale;
    }
    if let Some(weights) = weights {
        config.weights_per_vertex = weights;
    }
    config.validate()?;
    Ok(config)
}

/// List every armature's bones and frame range
fn list_bones(snapshot: &SceneSnapshot) {
    let mut found = false;
    for obj in snapshot.objects() {
        let Some(armature) = &obj.armature else {
            continue;
        };
        found = true;
        tracing::info!("Bones of '{}':", obj.name);
        for (i, bone) in armature.bones.iter().enumerate() {
            tracing::info!("  [{}] '{}'", i, bone.name);
        }
        match &armature.action {
            Some(action) => tracing::info!(
                "  action frames {}..={} ({} frames)",
                action.frame_start,
                action.frame_end,
                (action.frame_end - action.frame_start + 1).max(0)
            ),
            None => tracing::info!("  no action"),
        }
    }
    if !found {
        tracing::info!("No armatures in scene");
    }
}
