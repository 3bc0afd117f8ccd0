use vm_payload::{
    contract_key, verify_witness_bindings, BinaryReader, ExtensiblePayload, Header, MemorySnapshot,
    PayloadError, Serializable, UInt160, Verifiable, Witness,
};

fn signed(verification: Vec<u8>) -> ExtensiblePayload {
    let mut p = ExtensiblePayload::new(
        "StateService",
        10,
        20,
        UInt160::script_hash(&verification),
        vec![1, 2, 3],
    );
    p.witnesses_mut().push(Witness::new(vec![0x0c, 0x40], verification));
    p
}

#[test]
fn matching_witness_passes() {
    let p = signed(vec![0x0c, 0x21, 0x03]);
    assert!(verify_witness_bindings(&p, &MemorySnapshot::new()).is_ok());
}

#[test]
fn swapped_witness_is_rejected() {
    let mut p = signed(vec![0x0c, 0x21, 0x03]);
    let intruder = Witness::new(vec![0x0c, 0x40], vec![0x0c, 0x21, 0x04]);
    p.witnesses_mut()[0] = intruder.clone();
    match verify_witness_bindings(&p, &MemorySnapshot::new()) {
        Err(PayloadError::WitnessScriptMismatch { index, expected, actual }) => {
            assert_eq!(index, 0);
            assert_eq!(expected, p.sender);
            assert_eq!(actual, intruder.script_hash());
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn missing_witness_is_a_count_mismatch() {
    let mut p = signed(vec![0x0c]);
    p.witnesses_mut().clear();
    assert!(matches!(
        verify_witness_bindings(&p, &MemorySnapshot::new()),
        Err(PayloadError::WitnessCountMismatch { expected: 1, actual: 0 })
    ));
}

#[test]
fn contract_witness_requires_deployment() {
    let sender = UInt160::script_hash(b"deployed contract");
    let mut p = ExtensiblePayload::new("Oracle", 0, 1, sender, vec![]);
    p.witnesses_mut().push(Witness::new(vec![0x11], vec![]));

    let empty = MemorySnapshot::new();
    assert!(matches!(verify_witness_bindings(&p, &empty), Err(PayloadError::ContractNotFound(h)) if h == sender));

    let mut deployed = MemorySnapshot::new();
    deployed.insert(contract_key(&sender), vec![0x00]);
    assert!(verify_witness_bindings(&p, &deployed).is_ok());
}

#[test]
fn hash_survives_unsigned_round_trip_and_resigning() {
    let p = signed(vec![0x0c, 0x21, 0x05]);
    let unsigned = p.unsigned_bytes();
    let back = ExtensiblePayload::deserialize_unsigned(&mut BinaryReader::new(&unsigned)).unwrap();
    assert_eq!(back.hash(), p.hash());
    assert_eq!(back.unsigned_bytes(), unsigned);

    let mut resigned = ExtensiblePayload::from_bytes(&p.to_bytes()).unwrap();
    resigned.witnesses_mut()[0].invocation_script.extend_from_slice(&[0xaa; 64]);
    assert_eq!(resigned.hash(), p.hash());
    assert_ne!(resigned.to_bytes(), p.to_bytes());
}

#[test]
fn header_chain_binding() {
    let signer = vec![0x0c, 0x21, 0x07];
    let genesis = Header {
        next_consensus: UInt160::script_hash(&signer),
        witnesses: vec![Witness::new(vec![], vec![0x11])],
        ..Default::default()
    };
    let mut snap = MemorySnapshot::new();
    snap.insert(vm_payload::block_key(&genesis.hash()), genesis.to_bytes());
    assert!(verify_witness_bindings(&genesis, &snap).is_ok());

    let next = Header {
        prev_hash: genesis.hash(),
        index: 1,
        witnesses: vec![Witness::new(vec![0x0c, 0x40], signer)],
        ..Default::default()
    };
    assert!(verify_witness_bindings(&next, &snap).is_ok());

    let forged = Header { witnesses: vec![Witness::new(vec![], vec![0x0c])], ..next };
    assert!(matches!(
        verify_witness_bindings(&forged, &snap),
        Err(PayloadError::WitnessScriptMismatch { .. })
    ));
}
