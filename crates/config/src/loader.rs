// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Walks `<home>/cfg/{jobs,nodes,contexts}` into one immutable
//! [`ConfigSnapshot`] (`spec.md` §2 "Config loader", §6 "Filesystem
//! layout"). A missing `cfg/jobs` or `cfg/nodes` directory just means
//! zero jobs or nodes — only a malformed file already present is fatal.

use indexmap::IndexMap;
use laminar_core::{parse_kv, JobConfig, JobName, Node};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::snapshot::ConfigSnapshot;

/// Loads a fresh snapshot from `<home>/cfg/...`. Called once at startup
/// and again by `laminar-daemon`'s `SIGHUP` handler for an explicit
/// reload.
pub fn load(home: &Path) -> Result<ConfigSnapshot, ConfigError> {
    let cfg = home.join("cfg");
    let nodes = load_nodes(&cfg.join("nodes"))?;
    let jobs = load_jobs(&cfg.join("jobs"), &cfg.join("contexts"))?;
    Ok(ConfigSnapshot { jobs, nodes })
}

fn load_nodes(nodes_dir: &Path) -> Result<Vec<Node>, ConfigError> {
    let mut out = Vec::new();
    for path in sorted_files_with_ext(nodes_dir, "conf")? {
        let name = stem(&path);
        let contents = read_to_string(&path)?;
        let vars = parse_kv(&contents);

        let executors_raw =
            vars.get("EXECUTORS").ok_or_else(|| ConfigError::MissingExecutors { path: path.clone() })?;
        let num_executors: u32 = executors_raw.parse().map_err(|source| ConfigError::InvalidExecutors {
            path: path.clone(),
            value: executors_raw.clone(),
            source,
        })?;

        let tags: BTreeSet<String> = vars
            .get("TAGS")
            .map(|raw| split_csv(raw))
            .unwrap_or_default()
            .into_iter()
            .collect();

        out.push(Node::new(name, num_executors, tags));
    }
    Ok(out)
}

fn load_jobs(jobs_dir: &Path, contexts_dir: &Path) -> Result<IndexMap<JobName, JobConfig>, ConfigError> {
    let mut out = IndexMap::new();
    for main in sorted_files_with_ext(jobs_dir, "run")? {
        let name = stem(&main);
        let (before, after) = before_and_after(jobs_dir, &name);
        let conf = optional_sibling(jobs_dir, &name, "conf");

        let mut tags = BTreeSet::new();
        let mut context = Vec::new();
        if let Some(conf_path) = conf {
            let vars = parse_kv(&read_to_string(&conf_path)?);
            if let Some(raw) = vars.get("TAGS") {
                tags.extend(split_csv(raw));
            }
            if let Some(raw) = vars.get("CONTEXT") {
                for ctx_name in split_csv(raw) {
                    let ctx_path = contexts_dir.join(format!("{ctx_name}.env"));
                    if !ctx_path.is_file() {
                        return Err(ConfigError::UnknownContext { job: name.to_string(), context: ctx_name });
                    }
                    context.push(ctx_path);
                }
            }
        }
        if let Some(job_env) = optional_sibling(jobs_dir, &name, "env") {
            context.push(job_env);
        }

        let job = JobConfig { name: JobName::new(&name), before, main, after, tags, context };
        out.insert(job.name.clone(), job);
    }
    Ok(out)
}

fn optional_sibling(dir: &Path, stem: &str, ext: &str) -> Option<PathBuf> {
    let path = dir.join(format!("{stem}.{ext}"));
    path.is_file().then_some(path)
}

fn optional_sibling_vec(dir: &Path, stem: &str, ext: &str) -> Vec<PathBuf> {
    optional_sibling(dir, stem, ext).into_iter().collect()
}

/// Every `*.ext` file directly under `dir`, sorted by file name — the
/// order the scheduler's node scan and a fresh run's script sequence
/// both rely on being deterministic and stable across restarts.
fn sorted_files_with_ext(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, ConfigError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let entries = std::fs::read_dir(dir).map_err(|source| ConfigError::Io { path: dir.to_path_buf(), source })?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ConfigError::Io { path: dir.to_path_buf(), source })?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some(ext) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn stem(path: &Path) -> String {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or_default().to_string()
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

fn read_to_string(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })
}

// `.before` and `.after` are each a single optional script (`spec.md`
// §6), surfaced as a one-element `Vec` since `JobConfig::before`/`after`
// model an ordered *sequence* of pre/post steps.
fn before_and_after(dir: &Path, stem: &str) -> (Vec<PathBuf>, Vec<PathBuf>) {
    (optional_sibling_vec(dir, stem, "before"), optional_sibling_vec(dir, stem, "after"))
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
