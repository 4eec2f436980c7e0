//! EAP user-credential document generation (PEAP-MSCHAPv2)
//!
//! Credentials for enterprise networks are not part of the connection
//! profile; they are committed separately as an EAP user document. The
//! password is base64-encoded before embedding, and all substituted fields
//! are escaped with numeric character references so the document stays
//! well-formed whatever the credentials contain.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::core::types::CipherAlgorithm;
use crate::profile::ProfileError;

/// Generate the EAP user-credential document.
///
/// Only TKIP and CCMP networks carry enterprise credentials; any other
/// cipher fails with [`ProfileError::UnsupportedCipher`].
pub fn generate(
    cipher: CipherAlgorithm,
    username: &str,
    password: &str,
    domain: &str,
) -> Result<String, ProfileError> {
    match cipher {
        CipherAlgorithm::Tkip | CipherAlgorithm::Ccmp => {}
        other => return Err(ProfileError::UnsupportedCipher(other)),
    }

    let username = escape(username);
    let password = escape(&STANDARD.encode(password.as_bytes()));
    let domain = escape(domain);

    Ok(format!(
        r#"<?xml version="1.0"?>
<EapHostUserCredentials xmlns="http://www.microsoft.com/provisioning/EapHostUserCredentials"
                        xmlns:eapCommon="http://www.microsoft.com/provisioning/EapCommon"
                        xmlns:baseEap="http://www.microsoft.com/provisioning/BaseEapMethodUserCredentials">
    <EapMethod>
        <eapCommon:Type>25</eapCommon:Type>
        <eapCommon:AuthorId>0</eapCommon:AuthorId>
    </EapMethod>
    <Credentials xmlns:eapUser="http://www.microsoft.com/provisioning/EapUserPropertiesV1"
                 xmlns:baseEap="http://www.microsoft.com/provisioning/BaseEapUserPropertiesV1"
                 xmlns:MsPeap="http://www.microsoft.com/provisioning/MsPeapUserPropertiesV1"
                 xmlns:MsChapV2="http://www.microsoft.com/provisioning/MsChapV2UserPropertiesV1">
        <baseEap:Eap>
            <baseEap:Type>25</baseEap:Type>
            <MsPeap:EapType>
                <MsPeap:RoutingIdentity>{domain}\{username}</MsPeap:RoutingIdentity>
                <baseEap:Eap>
                    <baseEap:Type>26</baseEap:Type>
                    <MsChapV2:EapType>
                        <MsChapV2:Username>{username}</MsChapV2:Username>
                        <MsChapV2:Password>{password}</MsChapV2:Password>
                        <MsChapV2:LogonDomain>{domain}</MsChapV2:LogonDomain>
                    </MsChapV2:EapType>
                </baseEap:Eap>
            </MsPeap:EapType>
        </baseEap:Eap>
    </Credentials>
</EapHostUserCredentials>
"#
    ))
}

/// Escape XML specials as numeric character references.
///
/// `&` is replaced first so already-produced references are not re-escaped.
fn escape(value: &str) -> String {
    value
        .replace('&', "&#038;")
        .replace('<', "&#060;")
        .replace('>', "&#062;")
}
