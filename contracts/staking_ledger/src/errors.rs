/// Failure values surfaced by every fallible ledger entry point.
///
/// Codes are part of the contract ABI; never renumber an existing variant.
#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    /// `stake` was called with a non-positive amount.
    ZeroStakeAmount = 1,
    /// `withdraw` was called before the minimum stake period elapsed.
    MinimumStakePeriodNotMet = 2,
    /// The account has no principal in custody.
    NoActiveStake = 3,
    /// A guarded call was entered while another guarded call was in flight.
    ReentrancyDetected = 4,
    /// The asset collaborator rejected a transfer (balance or allowance).
    TransferFailed = 5,
    /// Custody minus staked principal cannot cover the reward owed.
    InsufficientRewardPool = 6,
    /// An intermediate or final amount left the `i128` range.
    ArithmeticOverflow = 7,
    /// Instance configuration is missing.
    NotInitialized = 8,
    /// `fund_rewards` was called with a non-positive amount.
    ZeroFundAmount = 9,
}
