//! RPC method handler for the WinWork JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! The `handle_method` function dispatches method calls to the repositories
//! and services over the connection held by `App`.

use std::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::App;
use crate::repositories::link_repository::LinkRepositoryTrait;
use crate::repositories::settings_repository::{SettingsRepository, SettingsRepositoryTrait};
use crate::repositories::tag_repository::{TagRepository, TagRepositoryTrait};
use crate::services::link_opener::ShellOpener;
use crate::services::link_service::{LinkService, LinkServiceTrait};
use crate::services::window_style::WindowStyle;
use crate::types::errors::{LinkError, TagError};
use crate::types::link::{Link, LinkTree, LinkType};
use crate::types::settings::{SettingKind, SettingValue};
use crate::types::tag::{is_valid_hex_color, Tag};

const DEFAULT_LIST_LIMIT: usize = 10;

/// Fields accepted by `link.create`.
#[derive(Debug, Deserialize)]
struct NewLinkParams {
    name: String,
    #[serde(rename = "type")]
    link_type: LinkType,
    url: Option<String>,
    description: Option<String>,
    notes: Option<String>,
    icon_path: Option<String>,
    parent_id: Option<i64>,
}

impl NewLinkParams {
    fn into_link(self) -> Link {
        let mut link = Link::new(&self.name, self.link_type, self.url.as_deref())
            .with_parent(self.parent_id);
        link.description = self.description;
        link.notes = self.notes;
        link.icon_path = self.icon_path;
        link
    }
}

/// Fields accepted by `window.set_style`. Opacity is clamped, not range-checked.
#[derive(Debug, Deserialize)]
struct StyleParams {
    background_color: String,
    opacity_percent: i64,
}

impl StyleParams {
    fn into_style(self) -> Result<WindowStyle, String> {
        let background_color = self.background_color.trim().to_string();
        if !is_valid_hex_color(&background_color) {
            return Err(format!("invalid background_color: {}", background_color));
        }
        Ok(WindowStyle {
            background_color,
            opacity_percent: self.opacity_percent.clamp(0, 100) as u8,
        })
    }
}

fn get_i64(params: &Value, key: &str) -> Result<i64, String> {
    params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| format!("missing {}", key))
}

fn get_str<'p>(params: &'p Value, key: &str) -> Result<&'p str, String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", key))
}

/// `parent_id` may be absent or null for the root group.
fn get_parent(params: &Value) -> Result<Option<i64>, String> {
    match params.get("parent_id") {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| "invalid parent_id".to_string()),
    }
}

fn get_limit(params: &Value) -> usize {
    params
        .get("limit")
        .and_then(|v| v.as_u64())
        .map(|l| l as usize)
        .unwrap_or(DEFAULT_LIST_LIMIT)
}

fn parse<T: for<'de> Deserialize<'de>>(params: &Value) -> Result<T, String> {
    serde_json::from_value(params.clone()).map_err(|e| format!("invalid params: {}", e))
}

/// Maps a JSON scalar onto the matching setting kind.
fn setting_from_json(value: &Value) -> Result<SettingValue, String> {
    match value {
        Value::String(s) => Ok(SettingValue::Text(s.clone())),
        Value::Bool(b) => Ok(SettingValue::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(SettingValue::Int(i)),
            None => n
                .as_f64()
                .map(SettingValue::Double)
                .ok_or_else(|| "invalid number".to_string()),
        },
        _ => Err("setting value must be a string, bool or number".to_string()),
    }
}

fn tree_to_json(tree: &LinkTree, parent: Option<i64>) -> Vec<Value> {
    tree.children_of(parent)
        .iter()
        .filter_map(|id| tree.get(*id))
        .map(|link| {
            json!({
                "link": link,
                "children": tree_to_json(tree, Some(link.id)),
            })
        })
        .collect()
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    let a = app.lock().map_err(|e| e.to_string())?;
    let conn = a.db.connection();

    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Links ───
        "link.get" => {
            let id = get_i64(params, "id")?;
            let svc = LinkService::new(conn);
            let link = svc.repository().get_by_id(id).map_err(|e| e.to_string())?;
            Ok(json!(link))
        }
        "link.list" => {
            let svc = LinkService::new(conn);
            Ok(json!(svc.repository().get_all().map_err(|e| e.to_string())?))
        }
        "link.roots" => {
            let svc = LinkService::new(conn);
            Ok(json!(svc.repository().get_roots().map_err(|e| e.to_string())?))
        }
        "link.children" => {
            let parent = get_parent(params)?;
            let svc = LinkService::new(conn);
            Ok(json!(svc.repository().get_children(parent).map_err(|e| e.to_string())?))
        }
        "link.tree" => {
            let svc = LinkService::new(conn);
            let tree = svc.load_tree().map_err(|e| e.to_string())?;
            Ok(json!(tree_to_json(&tree, None)))
        }
        "link.search" => {
            let query = get_str(params, "query")?;
            let svc = LinkService::new(conn);
            Ok(json!(svc.repository().search(query).map_err(|e| e.to_string())?))
        }
        "link.by_tag" => {
            let tag_id = get_i64(params, "tag_id")?;
            let svc = LinkService::new(conn);
            Ok(json!(svc.repository().get_by_tag(tag_id).map_err(|e| e.to_string())?))
        }
        "link.recent" => {
            let svc = LinkService::new(conn);
            let links = svc
                .repository()
                .get_recently_accessed(get_limit(params))
                .map_err(|e| e.to_string())?;
            Ok(json!(links))
        }
        "link.most_used" => {
            let svc = LinkService::new(conn);
            let links = svc
                .repository()
                .get_most_accessed(get_limit(params))
                .map_err(|e| e.to_string())?;
            Ok(json!(links))
        }
        "link.create" => {
            let link = parse::<NewLinkParams>(params)?.into_link();
            let mut svc = LinkService::new(conn);
            let created = svc.create_link(&link).map_err(|e| e.to_string())?;
            Ok(json!(created))
        }
        "link.update" => {
            let link: Link = parse(params)?;
            let mut svc = LinkService::new(conn);
            if !svc.update_link(&link).map_err(|e| e.to_string())? {
                return Err(LinkError::NotFound(link.id).to_string());
            }
            Ok(json!({"ok": true}))
        }
        "link.delete" => {
            let id = get_i64(params, "id")?;
            let mut svc = LinkService::new(conn);
            let removed = svc.delete_link_recursive(id).map_err(|e| e.to_string())?;
            let arr: Vec<Value> = removed
                .iter()
                .map(|(name, link_type)| json!({"name": name, "type": link_type}))
                .collect();
            Ok(json!({"removed": arr}))
        }
        "link.move" => {
            let id = get_i64(params, "id")?;
            let parent = get_parent(params)?;
            let order = params
                .get("sort_order")
                .and_then(|v| v.as_i64())
                .unwrap_or(i64::from(i32::MAX))
                .clamp(0, i64::from(i32::MAX)) as i32;
            let mut svc = LinkService::new(conn);
            let moved = svc.move_link(id, parent, order).map_err(|e| e.to_string())?;
            Ok(json!({"ok": moved}))
        }
        "link.access" => {
            let id = get_i64(params, "id")?;
            let mut svc = LinkService::new(conn);
            Ok(json!({"ok": svc.record_access(id).map_err(|e| e.to_string())?}))
        }
        "link.open" => {
            let id = get_i64(params, "id")?;
            let mut svc = LinkService::new(conn);
            let opened = svc.open_link(id, &ShellOpener).map_err(|e| e.to_string())?;
            Ok(json!({"ok": opened}))
        }

        // ─── Tags ───
        "tag.list" => {
            let repo = TagRepository::new(conn);
            Ok(json!(repo.get_all().map_err(|e| e.to_string())?))
        }
        "tag.search" => {
            let query = get_str(params, "query")?;
            let repo = TagRepository::new(conn);
            Ok(json!(repo.search(query).map_err(|e| e.to_string())?))
        }
        "tag.create" => {
            let name = get_str(params, "name")?;
            let color = params.get("color").and_then(|v| v.as_str());
            let description = params.get("description").and_then(|v| v.as_str());
            let mut repo = TagRepository::new(conn);
            let tag = repo.create(name, color, description).map_err(|e| e.to_string())?;
            Ok(json!(tag))
        }
        "tag.update" => {
            let tag: Tag = parse(params)?;
            let mut repo = TagRepository::new(conn);
            if !repo.update(&tag).map_err(|e| e.to_string())? {
                return Err(TagError::NotFound(tag.id).to_string());
            }
            Ok(json!({"ok": true}))
        }
        "tag.delete" => {
            let id = get_i64(params, "id")?;
            let mut repo = TagRepository::new(conn);
            Ok(json!({"ok": repo.delete(id).map_err(|e| e.to_string())?}))
        }
        "tag.for_link" => {
            let link_id = get_i64(params, "link_id")?;
            let repo = TagRepository::new(conn);
            Ok(json!(repo.get_tags_for_link(link_id).map_err(|e| e.to_string())?))
        }
        "tag.add_to_link" => {
            let link_id = get_i64(params, "link_id")?;
            let tag_id = get_i64(params, "tag_id")?;
            let mut repo = TagRepository::new(conn);
            let added = repo.add_tag_to_link(link_id, tag_id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": added}))
        }
        "tag.remove_from_link" => {
            let link_id = get_i64(params, "link_id")?;
            let tag_id = get_i64(params, "tag_id")?;
            let mut repo = TagRepository::new(conn);
            let removed = repo
                .remove_tag_from_link(link_id, tag_id)
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": removed}))
        }

        // ─── Settings ───
        "settings.get" => {
            let key = get_str(params, "key")?;
            let repo = SettingsRepository::new(conn);
            match params.get("kind") {
                Some(kind) => {
                    let kind: SettingKind = serde_json::from_value(kind.clone())
                        .map_err(|e| format!("invalid kind: {}", e))?;
                    let value = repo.get_typed(key, kind).map_err(|e| e.to_string())?;
                    Ok(json!({"key": key, "value": value}))
                }
                None => {
                    let value = repo.get(key).map_err(|e| e.to_string())?;
                    Ok(json!({"key": key, "value": value}))
                }
            }
        }
        "settings.set" => {
            let key = get_str(params, "key")?;
            let value = setting_from_json(params.get("value").ok_or("missing value")?)?;
            let description = params.get("description").and_then(|v| v.as_str());
            let mut repo = SettingsRepository::new(conn);
            repo.set(key, &value.to_canonical(), description)
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "settings.list" => {
            let repo = SettingsRepository::new(conn);
            Ok(json!(repo.get_all().map_err(|e| e.to_string())?))
        }
        "settings.delete" => {
            let key = get_str(params, "key")?;
            let mut repo = SettingsRepository::new(conn);
            Ok(json!({"ok": repo.delete(key).map_err(|e| e.to_string())?}))
        }

        // ─── Window ───
        "window.style" => {
            let repo = SettingsRepository::new(conn);
            let style = WindowStyle::load(&repo).map_err(|e| e.to_string())?;
            Ok(json!({
                "background_color": style.background_color,
                "opacity_percent": style.opacity_percent,
                "opacity": style.opacity(),
            }))
        }
        "window.set_style" => {
            let style = parse::<StyleParams>(params)?.into_style()?;
            let mut repo = SettingsRepository::new(conn);
            style.save(&mut repo).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
