use blobsign_azure_blob::{sign, sign_link, Config};
use blobsign_core::time::parse_rfc3339;
use blobsign_core::SigningRequest;
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;

criterion_group!(benches, bench);
criterion_main!(benches);

pub fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("azure_blob");

    let config = Config::try_from_connection_string(
        "AccountName=account;AccountKey=Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==",
    )
    .expect("connection string must be valid");

    group.bench_function("shared_key", |b| {
        b.iter(|| {
            let mut req = http::Request::new(());
            *req.method_mut() = http::Method::PUT;
            *req.uri_mut() = config
                .build_uri("/container/dir/blob.txt", &[("comp", "appendblock")])
                .expect("uri must be valid");
            let headers = req.headers_mut();
            headers.insert("content-length", "1024".parse().unwrap());
            headers.insert("content-type", "text/plain".parse().unwrap());
            headers.insert("x-ms-date", "Tue, 01 Mar 2022 08:12:34 GMT".parse().unwrap());
            headers.insert("x-ms-version", "2019-12-12".parse().unwrap());
            headers.insert("x-ms-meta-owner", "alice".parse().unwrap());

            let (mut parts, _) = req.into_parts();
            let snapshot = SigningRequest::build(&mut parts).expect("request must be valid");
            sign(config.credential(), &snapshot).expect("must success")
        })
    });

    group.bench_function("sign_link", |b| {
        let expiry = parse_rfc3339("2022-03-01T09:12:34Z").expect("time must be valid");

        b.iter(|| sign_link(&config, "/container/dir/blob.txt", Some(expiry)).expect("must success"))
    });

    group.finish();
}
