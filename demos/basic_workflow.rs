// demos/basic_workflow.rs

use base64::prelude::*;
use secrecy::Secret;
use serde_json::{json, Map};
use stellar_challenge_jwt::{AuthRequest, AuthService, JwtConfig, Network, SigningKeypair};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("stellar-challenge-jwt Basic Workflow");

    // 1. Setup authentication service. In a real deployment the network
    //    name and secret come from configuration.
    let network = Network::from_name("test");
    let jwt_config = JwtConfig {
        secret: Secret::new(BASE64_STANDARD.encode("example-secret-key")),
    };
    let service = AuthService::new(network, jwt_config);

    // The issuer key belongs to the service; the subject key to the
    // account holder proving control of it.
    let issuer = SigningKeypair::random();
    let subject = SigningKeypair::random();
    println!("Issuer address:  {}", issuer.address());
    println!("Subject address: {}", subject.address());

    // 2. Server builds a time-boxed challenge and sends it to the client.
    let challenge = service.build_challenge(&issuer, 300)?;
    println!("\nChallenge envelope: {}...", &challenge[..40]);

    // 3. Client verifies the issuer's signature and counter-signs. This
    //    would normally happen on the other side of the wire.
    let signed = service.sign_challenge(&subject, &challenge, &issuer.address())?;
    println!("Counter-signed:     {}...", &signed[..40]);

    // 4. Server validates the completed round trip and issues a session
    //    token carrying an extra claim.
    let mut extra = Map::new();
    extra.insert("role".to_string(), json!("admin"));
    let request = AuthRequest {
        signed_challenge: signed,
        subject_address: subject.address(),
    };
    match service.authenticate(&issuer.address(), &request, Some(&extra)) {
        Ok(response) => {
            println!("\nAuthentication successful!");
            println!("   Session token:  {}...", &response.session_token[..40]);
            println!("   Subject:        {}", response.subject_address);
            println!("   Challenge hash: {}", response.challenge_hash);
            println!("   Expires at:     {}", response.expires_at);

            // 5. Subsequent API calls present the session token.
            let claims = service.validate_session(&response.session_token)?;
            println!("\nSession valid for: {}", claims.sub);
            println!("Extra claims:      {:?}", claims.extra);
        }
        Err(e) => {
            println!("Authentication failed: {}", e);
        }
    }

    Ok(())
}
