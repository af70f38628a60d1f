use std::collections::{HashMap, HashSet};

use bridge_content::generate::skeleton_definition;
use bridge_content::{
    Formatter, GeneratedStep, GroupMeta, ParamSpec, TemplateMeta, format_or_original,
    render_step_file, step_file_path, update_step_file,
};
use bridge_fs::NormalizedPath;
use bridge_store::{Datastore, TemplateStep, TemplateStepGroup};

use super::write_file;
use crate::Result;
use crate::kinds::scan_step_files;
use crate::reconcile::{ReconcileResult, dry_run_suffix};

fn generated(store: &dyn Datastore, template: TemplateStep) -> GeneratedStep {
    let definition = if template.definition.trim().is_empty() {
        let params: Vec<ParamSpec> = store
            .template_params(template.id)
            .into_iter()
            .map(|p| ParamSpec {
                name: p.name,
                param_type: p.param_type,
                order: p.order,
            })
            .collect();
        skeleton_definition(template.kind, &template.signature, &params)
    } else {
        template.definition
    };
    GeneratedStep {
        kind: template.kind,
        signature: template.signature,
        meta: TemplateMeta {
            name: template.name,
            description: template.description,
            icon: template.icon,
        },
        definition,
    }
}

fn group_meta(group: &TemplateStepGroup) -> GroupMeta {
    GroupMeta {
        name: group.name.clone(),
        description: group.description.clone(),
        kind: group.kind,
    }
}

/// Write one step-definition file per stored step group.
///
/// An existing file for the group is edited in place so hand-written code
/// survives; otherwise the file is rendered at its default path. Files whose
/// group is no longer stored are left alone and reported as skipped.
pub fn export_steps(
    store: &dyn Datastore,
    root: &NormalizedPath,
    imports: &[String],
    formatter: &dyn Formatter,
    dry_run: bool,
) -> Result<ReconcileResult> {
    let mut result = ReconcileResult::new("step files", dry_run);
    tracing::info!("Exporting step groups to {}{}", root, dry_run_suffix(dry_run));

    // Non-step files are not this exporter's concern; only real errors carry over
    let mut scan = ReconcileResult::new("step files", dry_run);
    let files = if root.exists() {
        scan_step_files(root, &mut scan)?
    } else {
        Vec::new()
    };
    for error in scan.errors {
        result.error(error);
    }
    result.existing = files.len();

    let mut by_group: HashMap<String, (NormalizedPath, String)> = HashMap::new();
    for file in &files {
        if by_group.contains_key(&file.group.name) {
            result.warn(format!(
                "{}: group '{}' is declared by more than one file",
                file.path, file.group.name
            ));
            continue;
        }
        by_group.insert(file.group.name.clone(), (file.path.clone(), file.source.clone()));
    }

    let templates = store.templates();
    let groups = store.step_groups();
    result.scanned = groups.len();

    let mut exported = HashSet::new();
    for group in &groups {
        let steps: Vec<GeneratedStep> = templates
            .iter()
            .filter(|t| t.group_id == group.id)
            .cloned()
            .map(|t| generated(store, t))
            .collect();
        let meta = group_meta(group);

        let (path, content) = match by_group.get(&group.name) {
            Some((path, source)) => {
                (path.clone(), update_step_file(source, &meta, imports, &steps))
            }
            None => (
                step_file_path(root, group.kind, &group.name),
                render_step_file(&meta, imports, &steps),
            ),
        };
        let content = format_or_original(formatter, &content, path.as_str());
        write_file(&path, &content, &mut result);
        exported.insert(group.name.clone());
    }

    for file in &files {
        if !exported.contains(&file.group.name) {
            result.skip(file.path.to_string(), "step group is not stored, file left in place");
        }
    }
    result.log_summary();
    Ok(result)
}
