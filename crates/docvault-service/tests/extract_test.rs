//! Comparison of office and PDF documents.

mod helpers;

use bytes::Bytes;

use docvault_service::UploadRequest;

use helpers::TestEnv;

const DOCX: &[u8] = include_bytes!("fixtures/sample.docx");
const ODT: &[u8] = include_bytes!("fixtures/sample.odt");
const PDF: &[u8] = include_bytes!("fixtures/sample.pdf");

fn document(path: &str, name: &str, data: &'static [u8]) -> UploadRequest {
    UploadRequest {
        virtual_path: path.to_string(),
        name: name.to_string(),
        data: Bytes::from_static(data),
        notes: None,
        mime_type: None,
    }
}

#[tokio::test]
async fn test_compare_docx_with_odt() {
    let env = TestEnv::new().await;
    let a = env.user("a@example.com").await;

    let docx = env
        .uploads
        .upload(&a, document("/plan/word", "plan.docx", DOCX))
        .await
        .expect("docx");
    let odt = env
        .uploads
        .upload(&a, document("/plan/writer", "plan.odt", ODT))
        .await
        .expect("odt");

    let cmp = env.queries.compare(&a, docx.id, odt.id).await.expect("compare");
    assert_eq!(cmp.left.text, "Quarterly plan\nShip the first draft.\nAda\tBob & Co");
    assert_eq!(cmp.right.text, "Quarterly plan\nShip the first draft.\nOwners:  Ada\tBob & Co");
}

#[tokio::test]
async fn test_compare_pdf_with_text() {
    let env = TestEnv::new().await;
    let a = env.user("a@example.com").await;

    let pdf = env
        .uploads
        .upload(&a, document("/letter/scan", "letter.pdf", PDF))
        .await
        .expect("pdf");
    let txt = env.upload(&a, "/letter/draft", "Hello PDF").await.expect("txt");

    let cmp = env.queries.compare(&a, pdf.id, txt.id).await.expect("compare");
    assert!(cmp.left.text.contains("Hello"), "pdf text: {:?}", cmp.left.text);
    assert_eq!(cmp.right.text, "Hello PDF");
}

#[tokio::test]
async fn test_mislabelled_document_reports_extraction_failure() {
    let env = TestEnv::new().await;
    let a = env.user("a@example.com").await;

    let fake = env
        .uploads
        .upload(&a, document("/fake", "fake.odt", b"plain bytes"))
        .await
        .expect("upload");
    let txt = env.upload(&a, "/real", "real").await.expect("txt");

    let cmp = env.queries.compare(&a, fake.id, txt.id).await.expect("compare");
    assert!(cmp.left.text.starts_with("Unable to extract text"));
}
