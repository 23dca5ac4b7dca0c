use mint_storage::{BlockOverlay, MemoryStorage, Storage};
use mint_treasury::{
    fee_collector_account, reward_pool_account, ModuleRewardPool, RewardPool, RewardPoolSnapshot,
    TransferError,
};
use mint_types::{AccountName, Denom};

fn umint() -> Denom {
    Denom::new("umint").unwrap()
}

#[test]
fn pool_payouts_conserve_supply() {
    let store = MemoryStorage::new();
    let pool = ModuleRewardPool::new(&store);
    pool.fund(&umint(), 50_000).unwrap();

    for amount in [2_739u128, 2_739, 10, 0, 1] {
        pool.transfer(&umint(), amount, &fee_collector_account())
            .unwrap();
    }

    let snapshot = pool.snapshot(&umint()).unwrap();
    assert_eq!(snapshot.remaining + snapshot.distributed, 50_000);
    assert_eq!(snapshot.distributed, 5_489);
}

#[test]
fn payout_inside_overlay_is_invisible_until_commit() {
    let store = MemoryStorage::new();
    ModuleRewardPool::new(&store).fund(&umint(), 1_000).unwrap();

    let overlay = BlockOverlay::new(&store);
    ModuleRewardPool::new(&overlay)
        .transfer(&umint(), 400, &fee_collector_account())
        .unwrap();

    assert_eq!(
        store.get_balance(&reward_pool_account(), &umint()).unwrap(),
        1_000
    );
    assert_eq!(
        overlay
            .get_balance(&reward_pool_account(), &umint())
            .unwrap(),
        600
    );

    overlay.commit().unwrap();
    assert_eq!(ModuleRewardPool::new(&store).remaining(&umint()).unwrap(), 600);
}

#[test]
fn pool_can_pay_arbitrary_destination() {
    let store = MemoryStorage::new();
    let pool = ModuleRewardPool::new(&store);
    pool.fund(&umint(), 10).unwrap();

    let community = AccountName::new("community").unwrap();
    pool.transfer(&umint(), 10, &community).unwrap();
    assert_eq!(store.get_balance(&community, &umint()).unwrap(), 10);

    let err = pool.transfer(&umint(), 1, &community).unwrap_err();
    assert!(matches!(err, TransferError::InsufficientFunds { available: 0, .. }));
}

#[test]
fn snapshot_serializes_amounts() {
    let snapshot = RewardPoolSnapshot {
        denom: umint(),
        remaining: 7_261,
        distributed: 2_739,
    };
    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["denom"], "umint");
    assert_eq!(json["remaining"], 7_261);
}
