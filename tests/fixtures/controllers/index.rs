// Route module for /. Registered in the test module catalog.
