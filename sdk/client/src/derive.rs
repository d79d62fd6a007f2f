use twitter_primitives::{
  Address,
  AddressError,
  SeedLabel,
  SeedPart,
  PROGRAM_ID,
};

/// Computes the addresses of all program accounts.
///
/// Every account of the platform lives under an address derived from a
/// fixed label and the keys or ids of the entities it relates to, scoped
/// to a program id. Derivation is pure and deterministic, the same inputs
/// always produce the same address and no network access is involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressDeriver {
  program_id: Address,
}

impl Default for AddressDeriver {
  fn default() -> Self {
    Self::new(*PROGRAM_ID)
  }
}

impl AddressDeriver {
  pub fn new(program_id: Address) -> Self {
    Self { program_id }
  }

  pub fn program_id(&self) -> &Address {
    &self.program_id
  }

  /// Derives the address of an account along with its bump seed.
  ///
  /// Fails when the label, the parts and the bump seed together exceed
  /// [`MAX_SEEDS`](twitter_primitives::MAX_SEEDS).
  pub fn derive_with_bump(
    &self,
    label: SeedLabel,
    parts: &[SeedPart],
  ) -> Result<(Address, u8), AddressError> {
    let encoded: Vec<Vec<u8>> = parts.iter().map(SeedPart::to_bytes).collect();
    let mut seeds: Vec<&[u8]> = vec![label.as_str().as_bytes()];
    seeds.extend(encoded.iter().map(Vec::as_slice));
    Address::find_program_address(&seeds, &self.program_id)
  }

  pub fn derive(
    &self,
    label: SeedLabel,
    parts: &[SeedPart],
  ) -> Result<Address, AddressError> {
    self.derive_with_bump(label, parts).map(|(address, _)| address)
  }

  /// Derivation for the fixed shapes of platform accounts.
  fn platform(&self, label: SeedLabel, parts: &[SeedPart]) -> Address {
    // at most three parts of at most 32 bytes each
    self
      .derive(label, parts)
      .expect("platform seeds are within derivation limits")
  }

  /// Derives an address from arbitrary raw seeds.
  pub fn derive_raw(&self, seeds: &[&[u8]]) -> Result<(Address, u8), AddressError> {
    Address::find_program_address(seeds, &self.program_id)
  }

  pub fn program_state(&self) -> Address {
    self.platform(SeedLabel::ProgramState, &[])
  }

  pub fn user_profile(&self, owner: &Address) -> Address {
    self.platform(SeedLabel::UserProfile, &[SeedPart::Key(*owner)])
  }

  pub fn post(&self, post_id: u64) -> Address {
    self.platform(SeedLabel::Post, &[SeedPart::Id(post_id)])
  }

  pub fn comment(&self, comment_id: u64) -> Address {
    self.platform(SeedLabel::Comment, &[SeedPart::Id(comment_id)])
  }

  pub fn like(&self, user: &Address, post_id: u64) -> Address {
    self.platform(SeedLabel::Like, &[
      SeedPart::Key(*user),
      SeedPart::Id(post_id),
    ])
  }

  pub fn follow(&self, follower: &Address, target: &Address) -> Address {
    self.platform(SeedLabel::Follow, &[
      SeedPart::Key(*follower),
      SeedPart::Key(*target),
    ])
  }

  pub fn donation(&self, donor: &Address, creator: &Address) -> Address {
    self.platform(SeedLabel::Donation, &[
      SeedPart::Key(*donor),
      SeedPart::Key(*creator),
    ])
  }
}

#[cfg(test)]
mod tests {
  use {
    super::AddressDeriver,
    twitter_primitives::{Address, AddressError, SeedLabel, SeedPart},
  };

  fn alice() -> Address {
    Address::new([0x11; 32])
  }

  fn bob() -> Address {
    Address::new([0x22; 32])
  }

  fn addr(s: &str) -> Address {
    s.parse().unwrap()
  }

  #[test]
  fn platform_golden_vectors() {
    let deriver = AddressDeriver::default();
    assert_eq!(
      deriver.derive_with_bump(SeedLabel::ProgramState, &[]).unwrap(),
      (addr("8oNRKXB8uoVc7LUG7WszyvyYRM7nJFH1NDbVaYRomxSh"), 255)
    );
    assert_eq!(
      deriver
        .derive_with_bump(SeedLabel::UserProfile, &[alice().into()])
        .unwrap(),
      (addr("F4H3DPq4ry1V8CyhFnz8f2QdgUDbTarWzyh7zDAvsgSp"), 254)
    );
    assert_eq!(
      deriver.post(1),
      addr("FdrgN8GVwGh9aTco8JEQaq69JYP4Jz9C5shdtJeFodJ5")
    );
    assert_eq!(
      deriver.post(42),
      addr("43g78sc4T3LCcyBfPV2tSJHmP4JcbMUPiKcLYr3ygmQV")
    );
    assert_eq!(
      deriver.comment(1),
      addr("4zu9bCjn6MLbWaxVLvdyJc1nGUHyuhiN7T5pcEBHC6Cq")
    );
    assert_eq!(
      deriver.like(&alice(), 7),
      addr("5BVUeGrDtDS8fCDkkecwCZNzxoecdpAUKnJDHbzxYG5j")
    );
    assert_eq!(
      deriver.follow(&alice(), &bob()),
      addr("Akg9xHxeb99TdUyQ4TbHY51bsHgdjKLqW33w98SqjZyt")
    );
    assert_eq!(
      deriver.follow(&bob(), &alice()),
      addr("AZw5DrNfaPyGqEW3tTyFsnkuax4JQUBVxL2ScZ4nMdUM")
    );
    assert_eq!(
      deriver
        .derive_with_bump(SeedLabel::Donation, &[alice().into(), bob().into()])
        .unwrap(),
      (addr("BXSETHLVtu3kE7Q9s7vNgUsBdYe26ZYJAbQ97hxF1Qeu"), 254)
    );
  }

  #[test]
  fn derivation_is_deterministic() {
    let deriver = AddressDeriver::default();
    for id in [0, 1, 2, u64::MAX] {
      assert_eq!(deriver.post(id), deriver.post(id));
      assert_eq!(
        deriver.post(id),
        deriver.derive(SeedLabel::Post, &[SeedPart::Id(id)]).unwrap()
      );
    }
    assert_ne!(deriver.post(1), deriver.comment(1));
    assert_ne!(deriver.like(&alice(), 1), deriver.like(&bob(), 1));
  }

  #[test]
  fn raw_seeds_match_typed_helpers() {
    let deriver = AddressDeriver::default();
    let (address, _) = deriver
      .derive_raw(&[b"follow", alice().as_ref(), bob().as_ref()])
      .unwrap();
    assert_eq!(address, deriver.follow(&alice(), &bob()));
    assert!(deriver.derive_raw(&[&[0u8; 33]]).is_err());
  }

  #[test]
  fn program_id_scopes_addresses() {
    let other = AddressDeriver::new(Address::new([3; 32]));
    assert_ne!(other.program_state(), AddressDeriver::default().program_state());
    assert_eq!(other.program_id(), &Address::new([3; 32]));
  }

  #[test]
  fn too_many_parts_is_an_error() {
    let deriver = AddressDeriver::default();
    // label, 14 parts and the bump make the maximum of 16 seeds
    let parts: Vec<SeedPart> = (0..14).map(SeedPart::Id).collect();
    assert!(deriver.derive(SeedLabel::Post, &parts).is_ok());

    let parts: Vec<SeedPart> = (0..15).map(SeedPart::Id).collect();
    assert_eq!(
      deriver.derive_with_bump(SeedLabel::Post, &parts),
      Err(AddressError::TooManySeeds(17))
    );
  }
}
