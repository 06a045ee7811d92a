use benchmark_simple::*;
use jwt_pool::prelude::*;

fn main() {
    let bench = Bench::new();

    let options = &Options {
        iterations: 1000,
        warmup_iterations: 100,
        min_samples: 5,
        max_samples: 10,
        max_rsd: 1.0,
        ..Default::default()
    };

    let provider = DefaultProvider::generate("hs256 secret", "hs384 secret", "hs512 secret").unwrap();
    let payload = Claims::new()
        .with_subject("alice")
        .with_expiration(1_700_000_000u64)
        .with("role", "admin");

    for &alg in &[
        Algorithm::HS256,
        Algorithm::HS512,
        Algorithm::RS256,
        Algorithm::PS256,
        Algorithm::ES256,
        Algorithm::ES384,
        Algorithm::ES512,
    ] {
        let token = Token::sign(alg, &mut Claims::new(), &payload, &provider).unwrap();

        let res = bench.run(options, || {
            Token::sign(alg, &mut Claims::new(), &payload, &provider).unwrap()
        });
        println!("{} - sign: {}", alg, res.throughput(1));

        let res = bench.run(options, || Token::verify(&token, &provider).unwrap());
        println!("{} - verify: {}", alg, res.throughput(1));
    }

    let token =
        Token::sign_with_secret(Algorithm::HS256, &mut Claims::new(), &payload, "secret").unwrap();
    let res = bench.run(options, || Token::verify_with_secret(&token, "secret").unwrap());
    println!("HS256 (unpooled) - verify: {}", res.throughput(1));
}
