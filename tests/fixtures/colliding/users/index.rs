// Collides with users.rs.
