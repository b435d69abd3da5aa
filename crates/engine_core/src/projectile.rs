//! Projectiles: weapon fire in flight, plus the government-less "explosion"
//! case a dying ship leaves behind.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::content::WeaponDef;
use crate::types::{GovernmentId, ShipId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub weapon: WeaponDef,
    /// `None` marks a bare explosion: it resolves at fraction 0 on its first
    /// collision pass.
    pub government: Option<GovernmentId>,
    pub position: DVec2,
    pub velocity: DVec2,
    pub facing: f64,
    pub target: Option<ShipId>,
    pub lifetime: u32,
    pub removed: bool,
}

impl Projectile {
    pub fn fired(
        weapon: &WeaponDef,
        government: GovernmentId,
        position: DVec2,
        ship_velocity: DVec2,
        facing: f64,
        target: Option<ShipId>,
    ) -> Self {
        let unit = DVec2::new(facing.cos(), facing.sin());
        Self {
            weapon: weapon.clone(),
            government: Some(government),
            position,
            velocity: ship_velocity + unit * weapon.velocity,
            facing,
            target,
            lifetime: weapon.lifetime,
            removed: false,
        }
    }

    /// A ship's death blast: stationary, ownerless, resolved immediately.
    pub fn explosion(weapon: &WeaponDef, position: DVec2) -> Self {
        Self {
            weapon: weapon.clone(),
            government: None,
            position,
            velocity: DVec2::ZERO,
            facing: 0.0,
            target: None,
            lifetime: 1,
            removed: false,
        }
    }

    pub fn missile_strength(&self) -> u32 {
        self.weapon.missile_strength
    }

    pub fn kill(&mut self) {
        self.removed = true;
    }

    pub fn should_be_removed(&self) -> bool {
        self.removed
    }

    /// Advance one step: steer toward the homing target if any, then move.
    /// Expires (and is marked) when the lifetime runs out.
    pub fn advance(&mut self, target: Option<(DVec2, DVec2)>) {
        if self.removed {
            return;
        }
        if self.lifetime == 0 {
            self.removed = true;
            return;
        }
        self.lifetime -= 1;

        if self.weapon.homing_turn > 0.0 {
            if let Some((target_pos, _)) = target {
                let desired = (target_pos - self.position).to_angle();
                let mut delta = desired - self.facing;
                // Wrap to [-pi, pi] so the projectile turns the short way.
                while delta > std::f64::consts::PI {
                    delta -= std::f64::consts::TAU;
                }
                while delta < -std::f64::consts::PI {
                    delta += std::f64::consts::TAU;
                }
                let turn = delta.clamp(-self.weapon.homing_turn, self.weapon.homing_turn);
                self.facing += turn;
                let unit = DVec2::new(self.facing.cos(), self.facing.sin());
                self.velocity = unit * self.velocity.length();
            }
        }
        self.position += self.velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::base_content;
    use crate::types::WeaponId;

    #[test]
    fn expires_after_lifetime() {
        let content = base_content();
        let weapon = content.weapon(&WeaponId("blaster".to_string())).unwrap();
        let mut projectile = Projectile::fired(
            weapon,
            crate::types::GovernmentId("republic".to_string()),
            DVec2::ZERO,
            DVec2::ZERO,
            0.0,
            None,
        );
        for _ in 0..weapon.lifetime {
            projectile.advance(None);
            assert!(!projectile.should_be_removed());
        }
        projectile.advance(None);
        assert!(projectile.should_be_removed());
    }

    #[test]
    fn homing_projectile_turns_toward_target() {
        let content = base_content();
        let weapon = content.weapon(&WeaponId("missile".to_string())).unwrap();
        // Fired along +x; target sits along +y.
        let mut projectile = Projectile::fired(
            weapon,
            crate::types::GovernmentId("republic".to_string()),
            DVec2::ZERO,
            DVec2::ZERO,
            0.0,
            None,
        );
        let target = (DVec2::new(0.0, 1000.0), DVec2::ZERO);
        let before = projectile.velocity.normalize().dot(DVec2::Y);
        for _ in 0..10 {
            projectile.advance(Some(target));
        }
        let after = projectile.velocity.normalize().dot(DVec2::Y);
        assert!(after > before, "velocity should rotate toward the target");
    }

    #[test]
    fn explosion_has_no_government() {
        let content = base_content();
        let weapon = content.weapon(&WeaponId("torpedo".to_string())).unwrap();
        let explosion = Projectile::explosion(weapon, DVec2::new(5.0, 5.0));
        assert!(explosion.government.is_none());
        assert!(explosion.velocity.abs_diff_eq(DVec2::ZERO, f64::EPSILON));
    }
}
