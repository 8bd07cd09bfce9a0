// Route module for /users.
