//! Query layer integration tests.

mod helpers;

use docvault_core::error::ErrorKind;
use docvault_core::traits::BlobStore;
use docvault_core::types::NodeId;
use docvault_entity::permission::CapabilitySet;

use helpers::TestEnv;

#[tokio::test]
async fn test_list_owned_returns_roots_only() {
    let env = TestEnv::new().await;
    let a = env.user("a@example.com").await;

    let first = env.upload(&a, "/one", "1").await.expect("upload");
    env.upload(&a, "/one", "2").await.expect("upload");
    let second = env.upload(&a, "/two", "1").await.expect("upload");

    let owned = env.queries.list_owned(&a).await.expect("list");
    let ids: Vec<_> = owned.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[tokio::test]
async fn test_shared_listing_excludes_own_and_ungranted_chains() {
    let env = TestEnv::new().await;
    let a = env.user("a@example.com").await;
    let b = env.user("b@example.com").await;
    let c = env.user("c@example.com").await;

    let a_doc = env.upload(&a, "/a", "a").await.expect("upload");
    env.upload(&c, "/c", "c").await.expect("upload");
    let b_doc = env.upload(&b, "/b", "b").await.expect("upload");
    env.share(&b, &b_doc, "a@example.com", true).await;
    env.share(&a, &a_doc, "b@example.com", false).await;

    let shared = env.queries.list_shared_with_me(&a).await.expect("list");
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].node.id, b_doc.id);
    assert_eq!(shared[0].owner_email, "b@example.com");
    assert_eq!(shared[0].capabilities, CapabilitySet::FULL);

    let shared = env.queries.list_shared_with_me(&b).await.expect("list");
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].node.id, a_doc.id);
    assert!(shared[0].capabilities.view && !shared[0].capabilities.edit);

    assert!(env.queries.list_shared_with_me(&c).await.expect("list").is_empty());
}

#[tokio::test]
async fn test_detail_requires_view() {
    let env = TestEnv::new().await;
    let a = env.user("a@example.com").await;
    let b = env.user("b@example.com").await;

    let v1 = env.upload(&a, "/doc", "v1").await.expect("upload");
    let v2 = env.upload(&a, "/doc", "v2").await.expect("upload");

    let detail = env.queries.get_detail(&a, v1.id).await.expect("owner detail");
    let versions: Vec<_> = detail.versions.iter().map(|n| n.id).collect();
    assert_eq!(versions, vec![v2.id, v1.id]);

    let err = env.queries.get_detail(&b, v2.id).await.expect_err("stranger");
    assert_eq!(err.kind, ErrorKind::NotFound);

    env.share(&a, &v2, "b@example.com", false).await;
    let detail = env.queries.get_detail(&b, v2.id).await.expect("viewer detail");
    assert_eq!(detail.node.id, v2.id);
    assert_eq!(detail.versions.len(), 2);

    let versions = env.queries.list_versions(&b, v1.id).await.expect("versions");
    assert_eq!(versions.len(), 2);

    let err = env.queries.get_detail(&a, NodeId::new()).await.expect_err("missing");
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_download_latest_and_by_revision() {
    let env = TestEnv::new().await;
    let a = env.user("a@example.com").await;

    let v1 = env.upload(&a, "/doc", "first").await.expect("upload");
    env.upload(&a, "/doc", "second").await.expect("upload");
    let v3 = env.upload(&a, "/doc", "third").await.expect("upload");

    let latest = env
        .queries
        .download_by_path(Some(a.principal_id), "/doc", None)
        .await
        .expect("latest");
    assert_eq!(latest.node.id, v3.id);
    assert_eq!(&latest.data[..], b"third");

    let root = env
        .queries
        .download_by_path(Some(a.principal_id), "/doc", Some(1))
        .await
        .expect("revision 1");
    assert_eq!(root.node.id, v1.id);
    assert_eq!(&root.data[..], b"first");

    let err = env
        .queries
        .download_by_path(Some(a.principal_id), "/doc", Some(9))
        .await
        .expect_err("no such revision");
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = env
        .queries
        .download_by_path(Some(a.principal_id), "/nothing", None)
        .await
        .expect_err("no such path");
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_download_access_rules() {
    let env = TestEnv::new().await;
    let a = env.user("a@example.com").await;
    let b = env.user("b@example.com").await;

    let root = env.upload(&a, "/doc", "a-content").await.expect("upload");

    let err = env
        .queries
        .download_by_path(Some(b.principal_id), "/doc", None)
        .await
        .expect_err("stranger");
    assert_eq!(err.kind, ErrorKind::PermissionDenied);

    let err = env
        .queries
        .download_by_path(None, "/doc", None)
        .await
        .expect_err("anonymous");
    assert_eq!(err.kind, ErrorKind::PermissionDenied);

    // Anonymous callers cannot tell missing paths from existing ones.
    for (path, revision) in [("/nowhere", None), ("/doc", Some(99))] {
        let err = env
            .queries
            .download_by_path(None, path, revision)
            .await
            .expect_err("anonymous");
        assert_eq!(err.kind, ErrorKind::PermissionDenied);
    }

    env.share(&a, &root, "b@example.com", false).await;
    let download = env
        .queries
        .download_by_path(Some(b.principal_id), "/doc", None)
        .await
        .expect("viewer");
    assert_eq!(download.node.id, root.id);
}

#[tokio::test]
async fn test_download_prefers_callers_own_chain() {
    let env = TestEnv::new().await;
    let a = env.user("a@example.com").await;
    let b = env.user("b@example.com").await;

    let a_root = env.upload(&a, "/doc", "a1").await.expect("upload");
    env.upload(&a, "/doc", "a2").await.expect("upload");
    let b_root = env.upload(&b, "/doc", "b1").await.expect("upload");
    env.share(&a, &a_root, "b@example.com", false).await;

    let mine = env
        .queries
        .download_by_path(Some(b.principal_id), "/doc", None)
        .await
        .expect("own chain");
    assert_eq!(mine.node.id, b_root.id);
    assert_eq!(&mine.data[..], b"b1");

    let theirs = env
        .queries
        .download_by_path(Some(b.principal_id), "/doc", Some(2))
        .await
        .expect("shared chain revision");
    assert_eq!(&theirs.data[..], b"a2");
}

#[tokio::test]
async fn test_download_missing_blob_is_not_found() {
    let env = TestEnv::new().await;
    let a = env.user("a@example.com").await;

    let node = env.upload(&a, "/doc", "gone").await.expect("upload");
    env.blobs.delete(&node.blob_handle).await.expect("delete");

    let err = env
        .queries
        .download_by_path(Some(a.principal_id), "/doc", None)
        .await
        .expect_err("missing blob");
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.message, "File not found on disk");
}

#[tokio::test]
async fn test_compare_checks_each_side() {
    let env = TestEnv::new().await;
    let a = env.user("a@example.com").await;
    let b = env.user("b@example.com").await;

    let v1 = env.upload(&a, "/doc", "alpha").await.expect("upload");
    let v2 = env.upload(&a, "/doc", "beta").await.expect("upload");
    let b_doc = env.upload(&b, "/mine", "gamma").await.expect("upload");

    let cmp = env.queries.compare(&a, v1.id, v2.id).await.expect("compare");
    assert_eq!(cmp.left.text, "alpha");
    assert_eq!(cmp.right.text, "beta");
    assert_eq!(cmp.right.version_number, 2);

    let err = env.queries.compare(&a, v1.id, b_doc.id).await.expect_err("right");
    assert_eq!(err.kind, ErrorKind::PermissionDenied);
    assert!(err.message.contains("right"));

    let err = env.queries.compare(&a, b_doc.id, v1.id).await.expect_err("left");
    assert_eq!(err.kind, ErrorKind::PermissionDenied);
    assert!(err.message.contains("left"));

    let err = env.queries.compare(&a, v1.id, NodeId::new()).await.expect_err("missing");
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.message, "Right file not found");

    // A missing side is reported before an inaccessible one.
    let err = env.queries.compare(&a, b_doc.id, NodeId::new()).await.expect_err("missing");
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.message, "Right file not found");

    env.share(&b, &b_doc, "a@example.com", false).await;
    let cmp = env.queries.compare(&a, v1.id, b_doc.id).await.expect("shared right");
    assert_eq!(cmp.right.text, "gamma");
}
