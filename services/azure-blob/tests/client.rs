// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use blobsign_azure_blob::{BlobWrite, Client, Error, AZURE_VERSION};
use blobsign_core::{Context, ErrorKind};
use bytes::Bytes;
use http::{Method, StatusCode};
use pretty_assertions::assert_eq;

use crate::mock::{test_client, test_config, test_time, MockHttpSend};

#[tokio::test]
async fn test_create_container() {
    let mock = MockHttpSend::default();
    mock.respond(StatusCode::CREATED, "");

    test_client(&mock).create_container("container").await.unwrap();

    let reqs = mock.requests();
    assert_eq!(reqs.len(), 1);
    let req = &reqs[0];
    assert_eq!(req.method, Method::PUT);
    assert_eq!(
        req.uri.to_string(),
        "https://account.blob.core.windows.net/container?restype=container"
    );
    assert_eq!(req.header("content-length"), Some("0"));
    assert_eq!(req.header("x-ms-date"), Some("Tue, 01 Mar 2022 08:12:34 GMT"));
    assert_eq!(req.header("x-ms-version"), Some(AZURE_VERSION));
    assert_eq!(
        req.header("authorization"),
        Some(req.expected_authorization(test_config().credential()).as_str())
    );
}

#[tokio::test]
async fn test_put_block_blob() {
    let mock = MockHttpSend::default();
    mock.respond(StatusCode::CREATED, "");

    test_client(&mock)
        .put_blob("/container/dir/hello world.txt", BlobWrite::Block(Bytes::from("hello")))
        .await
        .unwrap();

    let reqs = mock.requests();
    assert_eq!(reqs.len(), 1);
    let req = &reqs[0];
    assert_eq!(req.method, Method::PUT);
    assert_eq!(
        req.uri.path(),
        "/container/dir/hello%20world.txt"
    );
    assert_eq!(req.header("x-ms-blob-type"), Some("BlockBlob"));
    assert_eq!(req.header("content-length"), Some("5"));
    assert_eq!(req.body, Bytes::from("hello"));
    assert_eq!(
        req.header("authorization"),
        Some(req.expected_authorization(test_config().credential()).as_str())
    );
}

#[tokio::test]
async fn test_put_append_blob() {
    let mock = MockHttpSend::default();
    mock.respond(StatusCode::CREATED, "")
        .respond(StatusCode::CREATED, "");

    test_client(&mock)
        .put_blob("/container/log.txt", BlobWrite::Append(Bytes::from("line\n")))
        .await
        .unwrap();

    let reqs = mock.requests();
    assert_eq!(reqs.len(), 2);

    assert_eq!(reqs[0].uri.query(), None);
    assert_eq!(reqs[0].header("x-ms-blob-type"), Some("AppendBlob"));
    assert_eq!(reqs[0].header("content-length"), Some("0"));
    assert!(reqs[0].body.is_empty());

    assert_eq!(reqs[1].uri.query(), Some("comp=appendblock"));
    assert_eq!(reqs[1].header("x-ms-blob-type"), None);
    assert_eq!(reqs[1].header("content-length"), Some("5"));
    assert_eq!(reqs[1].body, Bytes::from("line\n"));

    for req in &reqs {
        assert_eq!(
            req.header("authorization"),
            Some(req.expected_authorization(test_config().credential()).as_str())
        );
    }
}

#[tokio::test]
async fn test_put_append_blob_empty_body_skips_append() {
    let mock = MockHttpSend::default();
    mock.respond(StatusCode::CREATED, "");

    test_client(&mock)
        .put_blob("/container/log.txt", BlobWrite::Append(Bytes::new()))
        .await
        .unwrap();

    assert_eq!(mock.requests().len(), 1);
}

#[tokio::test]
async fn test_put_append_blob_stops_on_create_failure() {
    let mock = MockHttpSend::default();
    mock.respond(StatusCode::CONFLICT, "BlobAlreadyExists");

    let err = test_client(&mock)
        .put_blob("/container/log.txt", BlobWrite::Append(Bytes::from("line")))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::CONFLICT));
    assert_eq!(mock.requests().len(), 1);
}

#[tokio::test]
async fn test_get_blob() {
    let mock = MockHttpSend::default();
    mock.respond(StatusCode::OK, "content");

    let body = test_client(&mock)
        .get_blob("/container/blob.txt")
        .await
        .unwrap();
    assert_eq!(body, Bytes::from("content"));

    let req = &mock.requests()[0];
    assert_eq!(req.method, Method::GET);
    assert_eq!(req.header("content-length"), None);
}

#[tokio::test]
async fn test_delete_blob() {
    let mock = MockHttpSend::default();
    mock.respond(StatusCode::ACCEPTED, "");

    test_client(&mock)
        .delete_blob("/container/blob.txt")
        .await
        .unwrap();

    assert_eq!(mock.requests()[0].method, Method::DELETE);
}

#[tokio::test]
async fn test_delete_blob_rejected() {
    let mock = MockHttpSend::default();
    mock.respond(StatusCode::NOT_FOUND, "<Error><Code>BlobNotFound</Code></Error>");

    let err = test_client(&mock)
        .delete_blob("/container/missing.txt")
        .await
        .unwrap_err();

    match err {
        Error::UnexpectedResponse { status, body, .. } => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert!(body.contains("BlobNotFound"));
        }
        Error::Core(e) => panic!("expected UnexpectedResponse, got {e}"),
    }
    // Never retried.
    assert_eq!(mock.requests().len(), 1);
}

#[tokio::test]
async fn test_list_blobs_follows_next_marker() {
    let mock = MockHttpSend::default();
    mock.respond(
        StatusCode::OK,
        r#"<?xml version="1.0" encoding="utf-8"?><EnumerationResults ContainerName="container"><Prefix>dir/</Prefix><Blobs><Blob><Name>dir/a.txt</Name></Blob><Blob><Name>dir/b.txt</Name></Blob></Blobs><NextMarker>marker1</NextMarker></EnumerationResults>"#,
    )
    .respond(
        StatusCode::OK,
        r#"<?xml version="1.0" encoding="utf-8"?><EnumerationResults ContainerName="container"><Prefix>dir/</Prefix><Blobs><Blob><Name>dir/c.txt</Name></Blob></Blobs><NextMarker /></EnumerationResults>"#,
    );

    let names = test_client(&mock).list_blobs("/container/dir/").await.unwrap();
    assert_eq!(names, vec!["dir/a.txt", "dir/b.txt", "dir/c.txt"]);

    let reqs = mock.requests();
    assert_eq!(reqs.len(), 2);
    assert_eq!(reqs[0].uri.path(), "/container");
    assert_eq!(
        reqs[0].uri.query(),
        Some("restype=container&comp=list&prefix=dir/")
    );
    assert_eq!(
        reqs[1].uri.query(),
        Some("restype=container&comp=list&prefix=dir/&marker=marker1")
    );
    for req in &reqs {
        assert_eq!(
            req.header("authorization"),
            Some(req.expected_authorization(test_config().credential()).as_str())
        );
    }
}

#[tokio::test]
async fn test_list_blobs_whole_container() {
    let mock = MockHttpSend::default();
    mock.respond(
        StatusCode::OK,
        r#"<EnumerationResults><Blobs /><NextMarker /></EnumerationResults>"#,
    );

    let names = test_client(&mock).list_blobs("/container").await.unwrap();
    assert!(names.is_empty());
    assert_eq!(
        mock.requests()[0].uri.query(),
        Some("restype=container&comp=list")
    );
}

#[tokio::test]
async fn test_signed_link_sends_nothing() {
    let mock = MockHttpSend::default();

    let uri = test_client(&mock)
        .signed_link("/container/blob", Some(test_time()))
        .unwrap();

    assert!(uri.query().unwrap().contains("sr=b&sp=r&se=2022-03-01T08%3A12%3A34Z"));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_transport_error_is_passed_through() {
    let client = Client::new(Context::new(), test_config());

    let err = client.get_blob("/container/blob").await.unwrap_err();
    match err {
        Error::Core(e) => assert_eq!(e.kind(), ErrorKind::Unexpected),
        Error::UnexpectedResponse { .. } => panic!("expected transport error"),
    }
}

#[tokio::test]
async fn test_from_connection_string_rejects_invalid() {
    let err = Client::from_connection_string(Context::new(), "AccountName=account").unwrap_err();
    match err {
        Error::Core(e) => assert_eq!(e.kind(), ErrorKind::ConfigInvalid),
        Error::UnexpectedResponse { .. } => panic!("expected config error"),
    }
}
