//! Unit tests for inbound request parsing

use image_relay::api::request::ImageRequest;
use image_relay::backend::traits::{GenerateRequest, ProviderKind};
use image_relay::AppError;

#[test]
fn test_parse_full_body() {
    let request =
        ImageRequest::parse(br#"{"prompt":"a cat","n":2,"size":"256x256","model":"dalle"}"#)
            .unwrap();

    assert_eq!(
        request,
        ImageRequest {
            prompt: "a cat".to_string(),
            n: 2,
            size: "256x256".to_string(),
            model: "dalle".to_string(),
        }
    );
}

#[test]
fn test_missing_fields_default() {
    let request = ImageRequest::parse(b"{}").unwrap();
    assert_eq!(request, ImageRequest::default());
}

#[test]
fn test_capitalised_keys_and_unknown_fields() {
    let request =
        ImageRequest::parse(br#"{"Prompt":"a dog","N":4,"Model":"sdxl","style":"noir"}"#).unwrap();

    assert_eq!(request.prompt, "a dog");
    assert_eq!(request.n, 4);
    assert_eq!(request.model, "sdxl");
}

#[test]
fn test_keys_match_case_insensitively() {
    let request =
        ImageRequest::parse(br#"{"PROMPT":"a heron","n":2,"sIzE":"256x256","mOdel":"dalle"}"#)
            .unwrap();

    assert_eq!(
        request,
        ImageRequest {
            prompt: "a heron".to_string(),
            n: 2,
            size: "256x256".to_string(),
            model: "dalle".to_string(),
        }
    );
}

#[test]
fn test_last_duplicate_key_wins() {
    let request =
        ImageRequest::parse(br#"{"prompt":"first","Prompt":"second","model":"a","MODEL":"b"}"#)
            .unwrap();
    assert_eq!(request.prompt, "second");
    assert_eq!(request.model, "b");

    let request = ImageRequest::parse(br#"{"Prompt":"second","prompt":"first"}"#).unwrap();
    assert_eq!(request.prompt, "first");
}

#[test]
fn test_null_members_are_ignored() {
    let request =
        ImageRequest::parse(br#"{"prompt":"kept","PROMPT":null,"n":null,"model":null}"#).unwrap();

    assert_eq!(request.prompt, "kept");
    assert_eq!(request.n, 0);
    assert_eq!(request.model, "");
}

#[test]
fn test_malformed_bodies_are_rejected() {
    let bodies: [&[u8]; 5] = [
        b"",
        b"not json",
        b"{\"prompt\": ",
        br#"{"n": "two"}"#,
        b"[1, 2, 3]",
    ];

    for body in bodies {
        let err = ImageRequest::parse(body).unwrap_err();
        assert!(matches!(err, AppError::InvalidJson(_)));
        assert_eq!(err.to_string(), "Failed to parse json");
    }
}

#[test]
fn test_conversion_resolves_provider() {
    let dalle: GenerateRequest = ImageRequest {
        prompt: "p".to_string(),
        n: 1,
        size: String::new(),
        model: "dalle".to_string(),
    }
    .into();
    assert_eq!(dalle.provider, ProviderKind::Dalle);

    let sd: GenerateRequest = ImageRequest {
        prompt: "p".to_string(),
        n: 3,
        size: "512x512".to_string(),
        model: "realistic-vision-v13".to_string(),
    }
    .into();
    assert_eq!(
        sd.provider,
        ProviderKind::StableDiffusion {
            model_id: "realistic-vision-v13".to_string()
        }
    );
    assert_eq!(sd.n, 3);
    assert_eq!(sd.size, "512x512");
}
