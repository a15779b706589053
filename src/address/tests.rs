use std::sync::Arc;

use rayon::prelude::*;

use super::*;
use crate::model::{CodeElement, ElementKind, Namespace, ScopeModel, TopicTree, TypeKind};

fn baz() -> Arc<CodeElement> {
    Arc::new(CodeElement::new_type("Foo.Bar", "Baz", TypeKind::Class))
}

fn qux() -> CodeElement {
    CodeElement::member(&baz(), ElementKind::Method, "Qux")
}

fn make_provider() -> DocumentAddressProvider {
    let strategy = AddressingStrategy::new(AddressingScheme::Hierarchical)
        .with_granularity(Granularity::NAMESPACE | Granularity::TYPE)
        .with_file_extension(".html")
        .unwrap();
    DocumentAddressProvider::new(strategy, DocumentUrlContextManager::relative())
}

#[test]
fn test_end_to_end_scenario() {
    let provider = make_provider();
    let qux = qux();

    let address = provider.try_resolve_member_address(&qux).unwrap();
    assert_eq!(address.relative_url(), "Foo.Bar/Baz.html#Qux");
    assert_eq!(address.relative_file_path(), Some("Foo.Bar/Baz.html"));

    {
        let _scope = provider
            .begin_scope("Foo.Bar/", Some(ScopeModel::Namespace(Namespace::new("Foo.Bar"))))
            .unwrap();
        assert_eq!(provider.try_get_member_url(&qux).as_deref(), Some("Baz.html#Qux"));
    }
    {
        let _scope = provider.begin_scope("Other/", None).unwrap();
        assert_eq!(
            provider.try_get_member_url(&qux).as_deref(),
            Some("../Foo.Bar/Baz.html#Qux")
        );
    }
    assert!(provider.active_scope().is_root());
}

#[test]
fn test_scope_nesting_discipline() {
    let provider = make_provider();
    let mut s1 = provider.begin_scope("Foo.Bar", None).unwrap();
    let mut s2 = provider.begin_scope("Foo.Bar/Baz", None).unwrap();

    assert!(matches!(s1.end(), Err(AddressError::ScopeOrder { .. })));
    assert_eq!(provider.active_scope().directory(), "Foo.Bar/Baz/");

    s2.end().unwrap();
    s1.end().unwrap();
    assert_eq!(provider.contexts().depth(), 0);
}

#[test]
fn test_nested_scopes_restore_previous() {
    let provider = make_provider();
    let qux = qux();
    let _outer = provider.begin_scope("Foo.Bar", None).unwrap();
    {
        let _inner = provider.begin_scope("guide/advanced", None).unwrap();
        assert_eq!(
            provider.try_get_member_url(&qux).as_deref(),
            Some("../../Foo.Bar/Baz.html#Qux")
        );
    }
    assert_eq!(provider.try_get_member_url(&qux).as_deref(), Some("Baz.html#Qux"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_flow_isolation_across_tasks() {
    let provider = Arc::new(make_provider());
    let directories = ["Foo.Bar", "Other", "a/b/c", "Foo.Bar/Baz", ""];

    let mut tasks = Vec::new();
    for round in 0..8 {
        for directory in directories {
            let provider = Arc::clone(&provider);
            tasks.push(tokio::spawn(DocumentUrlContextManager::scope_flow(async move {
                let expected = provider.adjust_url("Foo.Bar/Baz.html").unwrap();
                assert_eq!(expected, "Foo.Bar/Baz.html");

                let _scope = provider.begin_scope(directory, None).unwrap();
                for _ in 0..=round {
                    tokio::task::yield_now().await;
                    assert_eq!(provider.active_scope().directory(), DirectoryMetadata::parse(directory).unwrap().directory());
                }
                provider.try_get_member_url(&qux())
            })));
        }
    }

    let mut urls = Vec::new();
    for task in tasks {
        urls.push(task.await.unwrap());
    }
    for (i, url) in urls.iter().enumerate() {
        let expected = match directories[i % directories.len()] {
            "Foo.Bar" => "Baz.html#Qux",
            "Other" => "../Foo.Bar/Baz.html#Qux",
            "a/b/c" => "../../../Foo.Bar/Baz.html#Qux",
            "Foo.Bar/Baz" => "../Baz.html#Qux",
            _ => "Foo.Bar/Baz.html#Qux",
        };
        assert_eq!(url.as_deref(), Some(expected));
    }
}

#[tokio::test]
async fn test_tasks_sharing_a_thread_need_a_flow() {
    let provider = Arc::new(make_provider());

    // Without a flow, tasks on one worker would share the thread's stack
    assert!(matches!(
        provider.begin_scope("a/b", None),
        Err(AddressError::FlowRequired(_))
    ));
    assert_eq!(provider.contexts().depth(), 0);

    let writer = {
        let provider = Arc::clone(&provider);
        tokio::spawn(DocumentUrlContextManager::scope_flow(async move {
            let _scope = provider.begin_scope("a/b", None).unwrap();
            for _ in 0..4 {
                tokio::task::yield_now().await;
                assert_eq!(provider.active_scope().directory(), "a/b/");
            }
        }))
    };
    let reader = {
        let provider = Arc::clone(&provider);
        tokio::spawn(DocumentUrlContextManager::scope_flow(async move {
            for _ in 0..4 {
                tokio::task::yield_now().await;
                assert!(provider.active_scope().is_root());
                assert_eq!(
                    provider.try_get_member_url(&qux()).as_deref(),
                    Some("Foo.Bar/Baz.html#Qux")
                );
            }
        }))
    };
    writer.await.unwrap();
    reader.await.unwrap();

    // Blocking sections can open scopes through `sync_flow`
    DocumentUrlContextManager::sync_flow(|| {
        let _scope = provider.begin_scope("Other", None).unwrap();
        assert_eq!(
            provider.try_get_member_url(&qux()).as_deref(),
            Some("../Foo.Bar/Baz.html#Qux")
        );
    });
}

#[test]
fn test_parallel_rendering_threads() {
    let provider = make_provider();
    let qux = qux();
    (0..64).into_par_iter().for_each(|i| {
        let directory = format!("section{i}/page");
        let _scope = provider.begin_scope(&directory, None).unwrap();
        assert_eq!(provider.active_scope().directory(), format!("{directory}/"));
        assert_eq!(
            provider.try_get_member_url(&qux).as_deref(),
            Some("../../Foo.Bar/Baz.html#Qux")
        );
    });
    assert_eq!(provider.contexts().depth(), 0);
}

#[test]
fn test_external_delegation() {
    let patterns = NamespacePatterns::new(["System.*"]).unwrap();
    let vendor = TemplateResolver::new(patterns, "https://learn.microsoft.com/dotnet/api/{id}").unwrap();
    let fallback = SearchResolver::new(
        NamespacePatterns::new(["Contoso.*"]).unwrap(),
        "https://search.example.com/?q={query}",
    )
    .unwrap();
    let provider = make_provider().with_resolver(vendor).with_resolver(fallback);

    let string = Arc::new(CodeElement::new_type("System", "String", TypeKind::Class));
    let _scope = provider.begin_scope("Foo.Bar", None).unwrap();

    // Claimed namespaces bypass local addressing and scope adjustment
    assert_eq!(
        provider.try_get_member_url(&string).as_deref(),
        Some("https://learn.microsoft.com/dotnet/api/system.string")
    );
    assert_eq!(
        provider.try_get_namespace_url(&Namespace::new("System.Text")).as_deref(),
        Some("https://learn.microsoft.com/dotnet/api/system.text")
    );
    let widget = CodeElement::new_type("Contoso", "Widget", TypeKind::Class);
    assert_eq!(
        provider.try_get_member_url(&widget).as_deref(),
        Some("https://search.example.com/?q=Contoso.Widget")
    );

    // Unclaimed namespaces stay local
    assert_eq!(provider.try_get_member_url(&qux()).as_deref(), Some("Baz.html#Qux"));

    // File lookups never consult resolvers
    assert_eq!(provider.try_get_member_file(&string).as_deref(), Some("System/String.html"));
}

#[test]
fn test_first_claiming_resolver_wins() {
    let site = SiteResolver::new(
        NamespacePatterns::new(["System.Text"]).unwrap(),
        "https://mirror.example.com/",
        AddressingStrategy::new(AddressingScheme::Flat),
    )
    .unwrap();
    let vendor = TemplateResolver::new(
        NamespacePatterns::new(["*"]).unwrap(),
        "https://vendor.example.com/{id}",
    )
    .unwrap();
    let provider = make_provider().with_resolver(site).with_resolver(vendor);

    let builder = CodeElement::new_type("System.Text", "StringBuilder", TypeKind::Class);
    assert_eq!(
        provider.try_get_member_url(&builder).as_deref(),
        Some("https://mirror.example.com/System.Text.StringBuilder.html")
    );
    // `*` claims the rest, including local namespaces
    assert_eq!(
        provider.try_get_member_url(&qux()).as_deref(),
        Some("https://vendor.example.com/foo.bar.baz.qux")
    );
}

#[test]
fn test_absolute_links() {
    let provider = DocumentAddressProvider::new(
        AddressingStrategy::default(),
        DocumentUrlContextManager::absolute("https://docs.example.com/v2").unwrap(),
    );
    let _scope = provider.begin_scope("Other", None).unwrap();
    assert_eq!(
        provider.try_get_member_url(&qux()).as_deref(),
        Some("https://docs.example.com/v2/Foo.Bar/Baz.html#Qux")
    );
    assert_eq!(
        provider.resolve_link("img/logo.png").as_deref(),
        Some("https://docs.example.com/v2/Other/img/logo.png")
    );
    assert_eq!(provider.active_scope().root_url(), "https://docs.example.com/v2/");
}

#[test]
fn test_topics_from_api_pages() {
    let provider = make_provider();
    let mut tree = TopicTree::new();
    let guide = tree.add_root("guide", "Guide");
    let setup = tree.add_child(guide, "setup", "Setup").unwrap();
    tree.pin(setup, "start/setup.html");

    let _scope = provider.begin_scope("Foo.Bar", None).unwrap();
    assert_eq!(
        provider.try_get_topic_url(tree.get(guide).unwrap()).as_deref(),
        Some("../guide/index.html")
    );
    assert_eq!(
        provider.try_get_topic_url(tree.get(setup).unwrap()).as_deref(),
        Some("../start/setup.html")
    );
    assert_eq!(
        provider.try_get_topic_file(tree.get(setup).unwrap()).as_deref(),
        Some("start/setup.html")
    );
}

#[test]
fn test_mapper_variants() {
    let mapper = PathToUrlMapper::new();
    mapper.add("docs/old-page", "guide/new-page.html").unwrap();

    for lookup in ["docs/old-page", "docs%2Fold-page", "docs/old-page.html", "Docs/Old-Page.HTML"] {
        assert_eq!(
            mapper.try_get_url(lookup).as_deref(),
            Some("guide/new-page.html"),
            "{lookup}"
        );
    }
    assert_eq!(
        mapper.try_get_url("docs/old-page.html?from=nav#top").as_deref(),
        Some("guide/new-page.html?from=nav#top")
    );
}

#[test]
fn test_unaddressable_members_miss() {
    let provider = make_provider();
    let baz = baz();
    let inherited = CodeElement::member(&baz, ElementKind::Method, "GetHashCode")
        .with_flags(crate::model::ElementFlags::INHERITED);
    assert_eq!(provider.try_get_member_url(&inherited), None);
    assert_eq!(provider.try_get_member_file(&inherited), None);
}
