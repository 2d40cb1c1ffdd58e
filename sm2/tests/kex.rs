//! SM2 key exchange tests.

use gm_sm2::{
    ContextConfig, Error, KeyPair, Role, SharedSecretSession, Sm2Context,
};

const ID_A: &[u8] = b"ALICE123@YAHOO.COM";
const ID_B: &[u8] = b"BILL456@YAHOO.COM";

struct Party {
    static_keys: KeyPair,
    ephemeral_keys: KeyPair,
}

impl Party {
    fn generate(ctx: &mut Sm2Context) -> Self {
        Self {
            static_keys: ctx.generate_key_pair().unwrap(),
            ephemeral_keys: ctx.generate_key_pair().unwrap(),
        }
    }

    fn session<'a>(
        &'a self,
        peer_static: &'a [u8],
        peer_ephemeral: &'a [u8],
        id: &'a [u8],
        peer_id: &'a [u8],
        role: Role,
    ) -> SharedSecretSession<'a> {
        SharedSecretSession {
            private_key: self.static_keys.private_key(),
            public_key: self.static_keys.public_key(),
            ephemeral_private_key: self.ephemeral_keys.private_key(),
            ephemeral_public_key: self.ephemeral_keys.public_key(),
            peer_public_key: peer_static,
            peer_ephemeral_public_key: peer_ephemeral,
            id,
            peer_id,
            role,
        }
    }

    fn wire_keys(&self) -> ([u8; 65], [u8; 65]) {
        (
            self.static_keys.public_key().to_sec1_bytes(),
            self.ephemeral_keys.public_key().to_sec1_bytes(),
        )
    }
}

fn context(seed: u8) -> Sm2Context {
    Sm2Context::with_config(&ContextConfig::new().seed([seed; 32])).unwrap()
}

#[test]
fn both_parties_derive_the_same_key() {
    let mut ctx_a = context(1);
    let mut ctx_b = context(2);
    let alice = Party::generate(&mut ctx_a);
    let bob = Party::generate(&mut ctx_b);
    let (alice_static, alice_ephemeral) = alice.wire_keys();
    let (bob_static, bob_ephemeral) = bob.wire_keys();

    let session_a = alice.session(&bob_static, &bob_ephemeral, ID_A, ID_B, Role::Initiator);
    let session_b = bob.session(&alice_static, &alice_ephemeral, ID_B, ID_A, Role::Responder);

    for klen in [1, 16, 32, 33, 128] {
        let key_a = ctx_a.calculate_shared_key(&session_a, klen).unwrap();
        let key_b = ctx_b.calculate_shared_key(&session_b, klen).unwrap();
        assert_eq!(key_a.len(), klen);
        assert_eq!(*key_a, *key_b);
    }
}

#[test]
fn confirmation_tags_cross_check() {
    let mut ctx_a = context(3);
    let mut ctx_b = context(4);
    let alice = Party::generate(&mut ctx_a);
    let bob = Party::generate(&mut ctx_b);
    let (alice_static, alice_ephemeral) = alice.wire_keys();
    let (bob_static, bob_ephemeral) = bob.wire_keys();

    let a = ctx_a
        .calculate_shared_key_with_confirmation(
            &alice.session(&bob_static, &bob_ephemeral, ID_A, ID_B, Role::Initiator),
            16,
        )
        .unwrap();
    let b = ctx_b
        .calculate_shared_key_with_confirmation(
            &bob.session(&alice_static, &alice_ephemeral, ID_B, ID_A, Role::Responder),
            16,
        )
        .unwrap();

    assert_eq!(*a.key, *b.key);
    assert_eq!(a.own_tag, b.peer_tag);
    assert_eq!(b.own_tag, a.peer_tag);
    assert_ne!(a.own_tag, b.own_tag);
    assert!(a.confirm_peer(&b.own_tag));
    assert!(b.confirm_peer(&a.own_tag));
    assert!(!a.confirm_peer(&a.own_tag));
}

#[test]
fn mismatched_identities_disagree() {
    let mut ctx_a = context(5);
    let mut ctx_b = context(6);
    let alice = Party::generate(&mut ctx_a);
    let bob = Party::generate(&mut ctx_b);
    let (alice_static, alice_ephemeral) = alice.wire_keys();
    let (bob_static, bob_ephemeral) = bob.wire_keys();

    let key_a = ctx_a
        .calculate_shared_key(
            &alice.session(&bob_static, &bob_ephemeral, ID_A, ID_B, Role::Initiator),
            32,
        )
        .unwrap();
    let key_b = ctx_b
        .calculate_shared_key(
            &bob.session(&alice_static, &alice_ephemeral, ID_B, b"MALLORY", Role::Responder),
            32,
        )
        .unwrap();
    assert_ne!(*key_a, *key_b);
}

#[test]
fn zero_length_key_is_rejected() {
    let mut ctx = context(7);
    let alice = Party::generate(&mut ctx);
    let bob = Party::generate(&mut ctx);
    let (bob_static, bob_ephemeral) = bob.wire_keys();
    let session = alice.session(&bob_static, &bob_ephemeral, ID_A, ID_B, Role::Initiator);
    assert_eq!(
        ctx.calculate_shared_key(&session, 0).map(|_| ()),
        Err(Error::InvalidParameter)
    );
}

#[test]
fn invalid_peer_key_is_rejected() {
    let mut ctx = context(8);
    let alice = Party::generate(&mut ctx);
    let bob = Party::generate(&mut ctx);
    let (bob_static, bob_ephemeral) = bob.wire_keys();

    let mut off_curve = bob_ephemeral;
    off_curve[64] ^= 0x01;
    let session = alice.session(&bob_static, &off_curve, ID_A, ID_B, Role::Initiator);
    assert_eq!(
        ctx.calculate_shared_key(&session, 16).map(|_| ()),
        Err(Error::InvalidPeerKey)
    );

    let session = alice.session(&bob_static[..64], &bob_ephemeral, ID_A, ID_B, Role::Initiator);
    assert_eq!(
        ctx.calculate_shared_key(&session, 16).map(|_| ()),
        Err(Error::InvalidPeerKey)
    );
}

#[test]
fn inconsistent_local_keys_are_rejected() {
    let mut ctx = context(9);
    let alice = Party::generate(&mut ctx);
    let bob = Party::generate(&mut ctx);
    let (bob_static, bob_ephemeral) = bob.wire_keys();

    let session = SharedSecretSession {
        ephemeral_public_key: bob.ephemeral_keys.public_key(),
        ..alice.session(&bob_static, &bob_ephemeral, ID_A, ID_B, Role::Initiator)
    };
    assert_eq!(
        ctx.calculate_shared_key(&session, 16).map(|_| ()),
        Err(Error::InvalidKey)
    );
}
