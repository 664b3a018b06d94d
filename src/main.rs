use std::process::ExitCode;

use color_eyre::eyre::{WrapErr, bail, eyre};
use ssh_krl::{
    Krl,
    config::{CheckSubject, Config},
    crypto::PublicKey,
    telemetry,
};

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let config = Config::load()?;
    tracing::debug!("Loaded configuration: {:?}", config);

    let data = std::fs::read(&config.krl.path)
        .wrap_err_with(|| format!("Failed to read KRL from {}", config.krl.path.display()))?;
    let krl = Krl::parse(&data).wrap_err("Failed to parse KRL")?;

    let trusted = config.krl.parse_trusted_signers()?;
    enforce_signers(&krl, config.krl.require_signature, &trusted)?;

    tracing::info!(
        version = krl.version,
        generated_date = krl.generated_date,
        sections = krl.sections.len(),
        signers = krl.signing_keys().len(),
        comment = %krl.comment,
        "Loaded KRL"
    );
    for signer in krl.signing_keys() {
        tracing::info!(signer = %signer, algorithm = signer.algorithm(), "Signed by");
    }

    let Some(check) = &config.check else {
        return Ok(ExitCode::SUCCESS);
    };
    let revoked = match check.subject()? {
        CheckSubject::Key(key) => krl.is_key_revoked(&key),
        CheckSubject::Certificate(cert) => krl.is_revoked(&cert),
    };

    if revoked {
        println!("revoked");
        Ok(ExitCode::FAILURE)
    } else {
        println!("not revoked");
        Ok(ExitCode::SUCCESS)
    }
}

fn enforce_signers(
    krl: &Krl,
    require_signature: bool,
    trusted: &[PublicKey],
) -> color_eyre::Result<()> {
    let signers = krl.signing_keys();
    if signers.is_empty() {
        if require_signature || !trusted.is_empty() {
            bail!("KRL is not signed");
        }
        return Ok(());
    }
    if !trusted.is_empty() && !signers.iter().any(|signer| trusted.contains(signer)) {
        return Err(eyre!("None of the {} KRL signers is trusted", signers.len()));
    }
    Ok(())
}
