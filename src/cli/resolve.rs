//! Resolving subcommands.
//!
//! Each command builds the engine from `docaddr.toml`, enters the scope given
//! by `--from` and prints the resolved URL (and output file, if any).

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use super::args::{Cli, Commands, ScopeArgs};
use docaddr::address::{DocumentAddressProvider, ScopeHandle};
use docaddr::config::SiteConfig;
use docaddr::model::{CodeElement, ElementFlags, ElementKind, Namespace, TopicId, TopicTree, TypeKind};
use docaddr::{debug_do, log};

/// Result of a single lookup.
#[derive(Debug, Serialize)]
struct Resolution {
    input: String,
    scope: String,
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<String>,
}

/// Result of a redirect lookup.
#[derive(Debug, Serialize)]
struct Redirect<'a> {
    path: &'a str,
    url: Option<String>,
}

/// Execute the selected command.
pub fn run(cli: &Cli, config: &SiteConfig) -> Result<()> {
    match &cli.command {
        Commands::Namespace { name, scope } => {
            let namespace = Namespace::new(name);
            resolve(config, scope, &namespace.signature(), |provider| {
                (
                    provider.try_get_namespace_url(&namespace),
                    provider.try_get_namespace_file(&namespace),
                )
            })
        }
        Commands::Member { id, type_kind, scope } => {
            let element = parse_documentation_id(id, (*type_kind).into())?;
            resolve(config, scope, &element.signature(), |provider| {
                (
                    provider.try_get_member_url(&element),
                    provider.try_get_member_file(&element),
                )
            })
        }
        Commands::Topic { path, title, pin, scope } => {
            let (tree, leaf) = topic_chain(path, title.as_deref(), pin.as_deref())?;
            resolve(config, scope, path, |provider| {
                let node = tree.get(leaf);
                (
                    node.and_then(|node| provider.try_get_topic_url(node)),
                    node.and_then(|node| provider.try_get_topic_file(node)),
                )
            })
        }
        Commands::Link { link, scope } => {
            resolve(config, scope, link, |provider| (provider.resolve_link(link), None))
        }
        Commands::Map { paths, json } => map_paths(config, paths, *json),
        Commands::Config { json } => {
            let output = if *json {
                serde_json::to_string_pretty(config)?
            } else {
                toml::to_string_pretty(config)?
            };
            println!("{}", output.trim_end());
            Ok(())
        }
    }
}

/// Enter `--from`, run `lookup`, print the result.
fn resolve(
    config: &SiteConfig,
    args: &ScopeArgs,
    input: &str,
    lookup: impl FnOnce(&DocumentAddressProvider) -> (Option<String>, Option<String>),
) -> Result<()> {
    let provider = config.build_provider().context("Failed to build address provider")?;

    let mut scope: ScopeHandle<'_> = provider
        .begin_scope(&args.from, None)
        .with_context(|| format!("Invalid scope directory `{}`", args.from))?;
    debug_do! {
        let context = scope.context();
        log!("scope"; "resolving from {} (root url `{}`)", context, context.root_url());
    }

    let (url, file) = lookup(&provider);
    let resolution = Resolution {
        input: input.to_string(),
        scope: scope.context().to_string(),
        url,
        file,
    };
    scope.end()?;

    print_resolution(&resolution, args.json)
}

fn print_resolution(resolution: &Resolution, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(resolution)?);
        return Ok(());
    }
    let Some(url) = &resolution.url else {
        bail!("`{}` has no address", resolution.input);
    };
    println!("{url}");
    if let Some(file) = &resolution.file {
        log!("file"; "{}", file);
    }
    Ok(())
}

fn map_paths(config: &SiteConfig, paths: &[String], json: bool) -> Result<()> {
    let mapper = config.build_mapper().context("Failed to load redirects")?;
    let redirects: Vec<Redirect<'_>> = paths
        .iter()
        .map(|path| Redirect {
            path,
            url: mapper.try_get_url(path),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&redirects)?);
        return Ok(());
    }
    let mut missing = 0;
    for redirect in &redirects {
        match &redirect.url {
            Some(url) => println!("{url}"),
            None => {
                log!("warning"; "no redirect for `{}`", redirect.path);
                missing += 1;
            }
        }
    }
    if missing > 0 {
        bail!("{missing} of {} paths have no redirect", redirects.len());
    }
    Ok(())
}

// ============================================================================
// Input Parsing
// ============================================================================

/// Parse a documentation id into a code element.
///
/// - `T:Foo.Bar.Baz`: type `Baz` in `Foo.Bar` (prefix optional)
/// - `T:Foo.Outer+Inner`: nested type
/// - `M:Foo.Bar.Baz.Qux(System.Int32)`: method with parameters
/// - `M:Foo.Bar.Baz.#ctor`, `M:Foo.Bar.Baz.op_Addition`
/// - `M:Foo.Bar.Baz.System#IDisposable#Dispose`: explicit implementation
/// - `P:`, `F:`, `E:`: property, field, event
///
/// `type_kind` applies to the innermost type.
fn parse_documentation_id(id: &str, type_kind: TypeKind) -> Result<CodeElement> {
    let id = id.trim();
    let (prefix, body) = match id.split_once(':') {
        Some((prefix, body)) if prefix.len() == 1 => (prefix, body),
        _ => ("T", id),
    };
    if body.is_empty() {
        bail!("empty documentation id `{id}`");
    }

    if prefix == "T" {
        return Ok(parse_type_path(body, type_kind)?.as_ref().clone());
    }
    let kind = match prefix {
        "M" => ElementKind::Method,
        "P" => ElementKind::Property,
        "F" => ElementKind::Field,
        "E" => ElementKind::Event,
        _ => bail!("unknown documentation id prefix `{prefix}:`"),
    };

    let (path, parameters) = match body.strip_suffix(')').and_then(|b| b.split_once('(')) {
        Some((path, parameters)) => (path, Some(parameters)),
        None => (body, None),
    };
    let Some((type_path, name)) = path.rsplit_once('.') else {
        bail!("member `{path}` has no declaring type");
    };
    let declaring_type = parse_type_path(type_path, type_kind)?;

    let kind = match name {
        "#ctor" | "#cctor" if kind == ElementKind::Method => ElementKind::Constructor,
        _ if kind == ElementKind::Method && name.starts_with("op_") => ElementKind::Operator,
        _ => kind,
    };
    let mut element = if name.contains('#') && kind != ElementKind::Constructor {
        CodeElement::member(&declaring_type, kind, name.replace('#', "."))
            .with_flags(ElementFlags::EXPLICIT_INTERFACE_IMPL)
    } else {
        CodeElement::member(&declaring_type, kind, name)
    };
    if let Some(parameters) = parameters.filter(|p| !p.is_empty()) {
        element = element.with_parameters(parameters);
    }
    Ok(element)
}

/// `Foo.Bar.Outer+Inner` -> `Inner` nested in `Outer`, namespace `Foo.Bar`.
fn parse_type_path(path: &str, type_kind: TypeKind) -> Result<Arc<CodeElement>> {
    let mut parts = path.split('+');
    let head = parts.next().unwrap_or_default();
    let nested: Vec<&str> = parts.collect();

    let (namespace, outer) = match head.rsplit_once('.') {
        Some((namespace, name)) => (Namespace::new(namespace), name),
        None => (Namespace::global(), head),
    };
    if outer.is_empty() || nested.iter().any(|name| name.is_empty()) {
        bail!("invalid type name `{path}`");
    }

    let kind_at = |depth: usize| {
        if depth == nested.len() { type_kind } else { TypeKind::Class }
    };
    let mut ty = Arc::new(CodeElement::new_type(namespace, outer, kind_at(0)));
    for (i, name) in nested.iter().enumerate() {
        ty = Arc::new(CodeElement::nested_type(&ty, *name, kind_at(i + 1)));
    }
    Ok(ty)
}

/// Build the topic chain for `guide/setup` and return the leaf.
fn topic_chain(path: &str, title: Option<&str>, pin: Option<&str>) -> Result<(TopicTree, TopicId)> {
    let ids: Vec<&str> = path.split('/').filter(|id| !id.is_empty()).collect();
    let Some((leaf, parents)) = ids.split_last() else {
        bail!("empty topic path");
    };

    let mut tree = TopicTree::new();
    let mut parent = None;
    for id in parents {
        parent = Some(match parent {
            Some(parent) => tree.add_child(parent, *id, *id).context("broken topic chain")?,
            None => tree.add_root(*id, *id),
        });
    }
    let title = title.unwrap_or(*leaf);
    let key = match parent {
        Some(parent) => tree.add_child(parent, *leaf, title).context("broken topic chain")?,
        None => tree.add_root(*leaf, title),
    };
    if let Some(pin) = pin {
        tree.pin(key, pin);
    }
    Ok((tree, key))
}
